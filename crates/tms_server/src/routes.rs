//! Route table, handlers and the OpenAPI document describing them.
//!
//! | Method | Path                | Operation        |
//! |--------|---------------------|------------------|
//! | GET    | `/`                 | liveness         |
//! | POST   | `/task`             | create           |
//! | GET    | `/tasks/complete`   | list complete    |
//! | GET    | `/tasks/incomplete` | list incomplete  |
//! | PATCH  | `/task/:id`         | toggle completed |
//! | GET    | `/openapi/json`     | OpenAPI document |

use crate::error::{ApiError, TASK_NOT_FOUND};
use crate::request_log::log_requests;
use crate::response::{ApiResponse, FailureResponse};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use log::debug;
use serde::Deserialize;
use tms_core::{liveness_message, Task, TaskId};
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};

/// Body of `POST /task`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[schema(example = "Buy milk")]
    pub title: String,
    /// Accepted for client compatibility; new tasks always start incomplete.
    #[serde(default)]
    pub is_completed: Option<bool>,
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Task API", description = "Create, list and toggle to-do tasks."),
    paths(liveness, create_task, list_complete, list_incomplete, toggle_task),
    components(schemas(Task, CreateTaskRequest, FailureResponse)),
    tags((name = "tasks", description = "To-do task operations"))
)]
pub struct ApiDoc;

/// Builds the full application router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(liveness).fallback(method_not_allowed))
        .route("/task", post(create_task).fallback(method_not_allowed))
        .route("/task/:id", patch(toggle_task).fallback(method_not_allowed))
        .route(
            "/tasks/complete",
            get(list_complete).fallback(method_not_allowed),
        )
        .route(
            "/tasks/incomplete",
            get(list_incomplete).fallback(method_not_allowed),
        )
        .route(
            "/openapi/json",
            get(openapi_json).fallback(method_not_allowed),
        )
        .fallback(route_not_found)
        .layer(middleware::from_fn(log_requests))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = String, content_type = "text/plain")
    )
)]
async fn liveness() -> &'static str {
    liveness_message()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[utoipa::path(
    post,
    path = "/task",
    tag = "tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = ApiResponse<Task>),
        (status = 400, description = "Missing, malformed or blank title", body = FailureResponse),
        (status = 500, description = "Storage failure", body = FailureResponse),
        (status = 504, description = "Storage timed out", body = FailureResponse)
    )
)]
async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) =
        body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    if request.is_completed == Some(true) {
        debug!("event=task_create module=http status=ignored field=isCompleted");
    }

    let title = request.title;
    let task = state
        .call(move |service| service.create_task(&title))
        .await
        .map_err(|err| ApiError::from_call(err, "task_create", "Failed to create task"))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Task created successfully", task)),
    ))
}

#[utoipa::path(
    get,
    path = "/tasks/complete",
    tag = "tasks",
    responses(
        (status = 200, description = "Completed tasks", body = ApiResponse<Vec<Task>>),
        (status = 500, description = "Storage failure", body = FailureResponse),
        (status = 504, description = "Storage timed out", body = FailureResponse)
    )
)]
async fn list_complete(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Task>>>, ApiError> {
    let tasks = state
        .call(|service| service.list_complete())
        .await
        .map_err(|err| ApiError::from_call(err, "task_list", "Failed to fetch completed tasks"))?;

    Ok(Json(ApiResponse::data(tasks)))
}

#[utoipa::path(
    get,
    path = "/tasks/incomplete",
    tag = "tasks",
    responses(
        (status = 200, description = "Incomplete tasks", body = ApiResponse<Vec<Task>>),
        (status = 500, description = "Storage failure", body = FailureResponse),
        (status = 504, description = "Storage timed out", body = FailureResponse)
    )
)]
async fn list_incomplete(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Task>>>, ApiError> {
    let tasks = state
        .call(|service| service.list_incomplete())
        .await
        .map_err(|err| {
            ApiError::from_call(err, "task_list", "Failed to fetch incomplete tasks")
        })?;

    Ok(Json(ApiResponse::data(tasks)))
}

#[utoipa::path(
    patch,
    path = "/task/{id}",
    tag = "tasks",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 200, description = "Completion flag flipped", body = ApiResponse<Task>),
        (status = 404, description = "No task with this id", body = FailureResponse),
        (status = 500, description = "Storage failure", body = FailureResponse),
        (status = 504, description = "Storage timed out", body = FailureResponse)
    )
)]
async fn toggle_task(
    State(state): State<AppState>,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<Json<ApiResponse<Task>>, ApiError> {
    // No task can carry an id that is not a UUID, nor one that fails to decode.
    let id: TaskId = raw_id
        .ok()
        .and_then(|Path(raw_id)| raw_id.parse().ok())
        .ok_or_else(|| ApiError::NotFound(TASK_NOT_FOUND.to_string()))?;

    let task = state
        .call(move |service| service.toggle_complete(id))
        .await
        .map_err(|err| ApiError::from_call(err, "task_toggle", "Failed to update task"))?;

    Ok(Json(ApiResponse::with_message(
        "Task status updated successfully",
        task,
    )))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("Method not allowed".to_string())
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
