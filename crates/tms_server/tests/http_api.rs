use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::time::Duration;
use tms_core::db::open_db_in_memory;
use tms_core::{
    InMemoryTaskRepository, RepoError, RepoResult, SqliteTaskRepository, Task, TaskId,
    TaskListQuery, TaskRepository,
};
use tms_server::{router, AppState};
use tower::ServiceExt;

fn memory_app() -> Router {
    router(AppState::new(
        Box::new(InMemoryTaskRepository::new()),
        Duration::from_secs(5),
    ))
}

fn sqlite_app() -> Router {
    let repo = SqliteTaskRepository::try_new(open_db_in_memory().unwrap()).unwrap();
    router(AppState::new(Box::new(repo), Duration::from_secs(5)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn create(app: &Router, title: &str) -> Value {
    let (status, body) = send(app, Method::POST, "/task", Some(json!({ "title": title }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"].clone()
}

fn ids(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn root_reports_liveness() {
    let response = memory_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Task API is running!");
}

#[tokio::test]
async fn create_returns_envelope_with_incomplete_task() {
    let app = memory_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/task",
        Some(json!({ "title": "Buy milk", "isCompleted": true })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Task created successfully");
    assert_eq!(body["data"]["title"], "Buy milk");
    assert_eq!(body["data"]["isCompleted"], false);
    assert!(body["data"]["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn buy_milk_scenario_over_http() {
    let app = sqlite_app();
    let task = create(&app, "Buy milk").await;
    let id = task["id"].as_str().unwrap().to_string();
    assert_eq!(task["isCompleted"], false);

    let (status, body) = send(&app, Method::PATCH, &format!("/task/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Task status updated successfully");
    assert_eq!(body["data"]["isCompleted"], true);

    let (_, body) = send(&app, Method::PATCH, &format!("/task/{id}"), None).await;
    assert_eq!(body["data"]["isCompleted"], false);

    let (status, complete) = send(&app, Method::GET, "/tasks/complete", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(complete["success"], true);
    assert!(complete.get("message").is_none());
    assert!(!ids(&complete).contains(&id));

    let (_, incomplete) = send(&app, Method::GET, "/tasks/incomplete", None).await;
    assert_eq!(ids(&incomplete), vec![id]);
}

#[tokio::test]
async fn create_rejects_blank_title() {
    let app = memory_app();

    let (status, body) = send(&app, Method::POST, "/task", Some(json!({ "title": "   " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "success": false, "message": "title cannot be empty" })
    );
    let (_, incomplete) = send(&app, Method::GET, "/tasks/incomplete", None).await;
    assert!(ids(&incomplete).is_empty());
}

#[tokio::test]
async fn create_rejects_missing_or_malformed_body() {
    let app = memory_app();

    let (status, body) = send(&app, Method::POST, "/task", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("title"));

    let (status, body) = send(&app, Method::POST, "/task", Some(json!({ "title": 42 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/task")
                .body(Body::from("title=Buy milk"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn toggle_unknown_or_malformed_id_is_not_found() {
    let app = memory_app();
    let kept = create(&app, "kept").await;

    let missing = uuid::Uuid::new_v4();
    let (status, body) = send(&app, Method::PATCH, &format!("/task/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "message": "Task not found" }));

    let (status, body) = send(&app, Method::PATCH, "/task/64f1c2e9a1b2c3d4e5f60718", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");

    let (_, incomplete) = send(&app, Method::GET, "/tasks/incomplete", None).await;
    assert_eq!(incomplete["data"], json!([kept]));
}

#[tokio::test]
async fn unknown_route_uses_envelope() {
    let (status, body) = send(&memory_app(), Method::GET, "/complete", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn toggle_with_undecodable_id_is_not_found() {
    let app = memory_app();
    let kept = create(&app, "kept").await;

    let (status, body) = send(&app, Method::PATCH, "/task/%FF", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "message": "Task not found" }));

    let (_, incomplete) = send(&app, Method::GET, "/tasks/incomplete", None).await;
    assert_eq!(incomplete["data"], json!([kept]));
}

#[tokio::test]
async fn wrong_method_on_known_path_is_405_envelope() {
    let app = memory_app();
    let task = create(&app, "untouched").await;
    let id = task["id"].as_str().unwrap();
    let task_path = format!("/task/{id}");

    for (method, uri) in [
        (Method::GET, "/task"),
        (Method::DELETE, task_path.as_str()),
        (Method::POST, "/tasks/complete"),
    ] {
        let (status, body) = send(&app, method.clone(), uri, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        assert_eq!(body, json!({ "success": false, "message": "Method not allowed" }));
    }

    let (_, incomplete) = send(&app, Method::GET, "/tasks/incomplete", None).await;
    assert_eq!(incomplete["data"], json!([task]));
}

#[tokio::test]
async fn openapi_document_lists_every_route() {
    let (status, body) = send(&memory_app(), Method::GET, "/openapi/json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["openapi"].as_str().unwrap().starts_with("3."));

    let paths = body["paths"].as_object().unwrap();
    for path in ["/", "/task", "/task/{id}", "/tasks/complete", "/tasks/incomplete"] {
        assert!(paths.contains_key(path), "missing {path}");
    }
    assert!(paths["/task"].get("post").is_some());
    assert!(paths["/task/{id}"].get("patch").is_some());
    assert!(body["components"]["schemas"].get("Task").is_some());
}

#[tokio::test]
async fn lists_partition_created_tasks() {
    let app = memory_app();
    let mut created = Vec::new();
    for index in 0..5 {
        let task = create(&app, &format!("task {index}")).await;
        created.push(task["id"].as_str().unwrap().to_string());
    }
    for id in created.iter().step_by(2) {
        send(&app, Method::PATCH, &format!("/task/{id}"), None).await;
    }

    let (_, complete) = send(&app, Method::GET, "/tasks/complete", None).await;
    let (_, incomplete) = send(&app, Method::GET, "/tasks/incomplete", None).await;

    assert_eq!(ids(&complete), vec![created[0].clone(), created[2].clone(), created[4].clone()]);
    assert_eq!(ids(&incomplete), vec![created[1].clone(), created[3].clone()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_toggles_over_http_lose_no_updates() {
    let app = sqlite_app();
    let task = create(&app, "contended").await;
    let id = task["id"].as_str().unwrap().to_string();

    let toggles = 9;
    let handles: Vec<_> = (0..toggles)
        .map(|_| {
            let app = app.clone();
            let uri = format!("/task/{id}");
            tokio::spawn(async move { send(&app, Method::PATCH, &uri, None).await })
        })
        .collect();
    for handle in handles {
        let (status, _) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    let (_, complete) = send(&app, Method::GET, "/tasks/complete", None).await;
    assert_eq!(ids(&complete), vec![id]);
}

struct FailingRepository;

impl TaskRepository for FailingRepository {
    fn create_task(&self, _title: &str) -> RepoResult<Task> {
        Err(RepoError::InvalidData("disk on fire".to_string()))
    }

    fn list_tasks(&self, _query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        Err(RepoError::InvalidData("disk on fire".to_string()))
    }

    fn toggle_task(&self, _id: TaskId) -> RepoResult<Task> {
        Err(RepoError::InvalidData("disk on fire".to_string()))
    }
}

#[tokio::test]
async fn storage_failures_become_uniform_failures() {
    let app = router(AppState::new(Box::new(FailingRepository), Duration::from_secs(5)));

    let (status, body) = send(&app, Method::POST, "/task", Some(json!({ "title": "x" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "success": false, "message": "Failed to create task" }));

    let (_, body) = send(&app, Method::GET, "/tasks/complete", None).await;
    assert_eq!(body["message"], "Failed to fetch completed tasks");

    let (_, body) = send(&app, Method::GET, "/tasks/incomplete", None).await;
    assert_eq!(body["message"], "Failed to fetch incomplete tasks");

    let (_, body) = send(
        &app,
        Method::PATCH,
        &format!("/task/{}", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(body["message"], "Failed to update task");
}

struct SlowRepository;

impl TaskRepository for SlowRepository {
    fn create_task(&self, title: &str) -> RepoResult<Task> {
        std::thread::sleep(Duration::from_millis(300));
        Ok(Task::new(title)?)
    }

    fn list_tasks(&self, _query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        std::thread::sleep(Duration::from_millis(300));
        Ok(Vec::new())
    }

    fn toggle_task(&self, id: TaskId) -> RepoResult<Task> {
        Err(RepoError::NotFound(id))
    }
}

#[tokio::test]
async fn slow_storage_times_out() {
    let app = router(AppState::new(Box::new(SlowRepository), Duration::from_millis(20)));

    let (status, body) = send(&app, Method::GET, "/tasks/incomplete", None).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Failed to fetch incomplete tasks: storage timed out"
    );
}
