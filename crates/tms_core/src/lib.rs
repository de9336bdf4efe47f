//! Core domain logic for the task service.
//! This crate is the single source of truth for task invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, LogTarget, LoggingError};
pub use model::task::{normalize_title, Task, TaskId, TaskValidationError, MAX_TITLE_CHARS};
pub use repo::memory_repo::InMemoryTaskRepository;
pub use repo::task_repo::{
    RepoError, RepoResult, SqliteTaskRepository, TaskListQuery, TaskRepository,
};
pub use service::task_service::{ServiceError, ServiceResult, TaskService};

/// Liveness text served at the root route.
pub fn liveness_message() -> &'static str {
    "Task API is running!"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
