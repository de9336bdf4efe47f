//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/list/toggle APIs over the canonical `tasks` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Toggle is one `UPDATE ... RETURNING` statement, never read-then-write.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::task::{Task, TaskId, TaskValidationError};
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    is_completed
FROM tasks";

const REQUIRED_TASK_COLUMNS: &[&str] = &["id", "title", "is_completed", "created_at", "updated_at"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    /// `None` lists every task.
    pub completed: Option<bool>,
}

impl TaskListQuery {
    pub fn complete() -> Self {
        Self {
            completed: Some(true),
        }
    }

    pub fn incomplete() -> Self {
        Self {
            completed: Some(false),
        }
    }
}

/// Repository interface for task operations.
pub trait TaskRepository: Send + Sync {
    /// Stores a new incomplete task under a freshly assigned id.
    fn create_task(&self, title: &str) -> RepoResult<Task>;
    /// Lists tasks in creation order.
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    /// Atomically flips `is_completed` and returns the updated task.
    fn toggle_task(&self, id: TaskId) -> RepoResult<Task>;
}

impl<R: TaskRepository + ?Sized> TaskRepository for Box<R> {
    fn create_task(&self, title: &str) -> RepoResult<Task> {
        (**self).create_task(title)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        (**self).list_tasks(query)
    }

    fn toggle_task(&self, id: TaskId) -> RepoResult<Task> {
        (**self).toggle_task(id)
    }
}

/// SQLite-backed task repository.
///
/// Owns its connection so it can be shared across request handlers.
pub struct SqliteTaskRepository {
    conn: Mutex<Connection>,
}

impl SqliteTaskRepository {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema is
    ///   not the one this binary expects.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl TaskRepository for SqliteTaskRepository {
    fn create_task(&self, title: &str) -> RepoResult<Task> {
        let task = Task::new(title)?;
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO tasks (id, title, is_completed) VALUES (?1, ?2, ?3);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                bool_to_int(task.is_completed),
            ],
        )?;

        Ok(task)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(completed) = query.completed {
            sql.push_str(" AND is_completed = ?");
            bind_values.push(Value::Integer(bool_to_int(completed)));
        }

        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn toggle_task(&self, id: TaskId) -> RepoResult<Task> {
        let mut conn = self.conn.lock();
        // Dropping the transaction on any error rolls the flip back.
        let tx = conn.transaction()?;
        let task = flip_completed(&tx, id)?;
        tx.commit()?;
        Ok(task)
    }
}

fn flip_completed(conn: &Connection, id: TaskId) -> RepoResult<Task> {
    let mut stmt = conn.prepare(
        "UPDATE tasks
         SET
            is_completed = 1 - is_completed,
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE id = ?1
         RETURNING id, title, is_completed;",
    )?;

    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => parse_task_row(row),
        None => Err(RepoError::NotFound(id)),
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'tasks'
        );",
        [],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable("tasks"));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(tasks);")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    for &column in REQUIRED_TASK_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "tasks",
                column,
            });
        }
    }

    Ok(())
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid id value `{id_text}` in tasks.id")))?;

    let is_completed = match row.get::<_, i64>("is_completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_completed value `{other}` in tasks.is_completed"
            )));
        }
    };

    let task = Task {
        id,
        title: row.get("title")?,
        is_completed,
    };
    task.validate()?;
    Ok(task)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
