//! Task use-case service.
//!
//! # Responsibility
//! - Provide the create/list/toggle entry points served over HTTP.
//! - Translate repository outcomes into typed use-case errors.
//!
//! # Invariants
//! - Created tasks are always incomplete.
//! - Toggle delegates to the repository's atomic toggle; the service never
//!   reads a task and writes it back.
//! - Log events carry ids and counts only, never titles.

use crate::model::task::{normalize_title, Task, TaskId, TaskValidationError};
use crate::repo::task_repo::{RepoError, TaskListQuery, TaskRepository};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for task use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input failed task validation.
    Validation(TaskValidationError),
    /// Target task does not exist.
    NotFound(TaskId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for ServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Use-case service wrapper for task operations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a new incomplete task.
    ///
    /// # Errors
    /// - `Validation` when the trimmed title is empty or too long.
    /// - `Repo` on storage failures, which are not retried.
    pub fn create_task(&self, title: &str) -> ServiceResult<Task> {
        let title = normalize_title(title).inspect_err(|err| {
            debug!("event=task_create module=service status=rejected reason={err}");
        })?;
        let task = self.repo.create_task(&title).inspect_err(|err| {
            warn!("event=task_create module=service status=error error={err}");
        })?;
        info!(
            "event=task_create module=service status=ok task_id={}",
            task.id
        );
        Ok(task)
    }

    /// Lists tasks with `is_completed = false`.
    pub fn list_incomplete(&self) -> ServiceResult<Vec<Task>> {
        self.list(TaskListQuery::incomplete())
    }

    /// Lists tasks with `is_completed = true`.
    pub fn list_complete(&self) -> ServiceResult<Vec<Task>> {
        self.list(TaskListQuery::complete())
    }

    /// Flips the completion flag of one task.
    ///
    /// # Errors
    /// - `NotFound` when no task has `id`; no task is modified.
    pub fn toggle_complete(&self, id: TaskId) -> ServiceResult<Task> {
        match self.repo.toggle_task(id) {
            Ok(task) => {
                info!(
                    "event=task_toggle module=service status=ok task_id={} is_completed={}",
                    task.id, task.is_completed
                );
                Ok(task)
            }
            Err(RepoError::NotFound(id)) => {
                debug!("event=task_toggle module=service status=not_found task_id={id}");
                Err(ServiceError::NotFound(id))
            }
            Err(err) => {
                warn!("event=task_toggle module=service status=error task_id={id} error={err}");
                Err(err.into())
            }
        }
    }

    fn list(&self, query: TaskListQuery) -> ServiceResult<Vec<Task>> {
        let completed = query.completed.unwrap_or_default();
        match self.repo.list_tasks(&query) {
            Ok(tasks) => {
                debug!(
                    "event=task_list module=service status=ok completed={} count={}",
                    completed,
                    tasks.len()
                );
                Ok(tasks)
            }
            Err(err) => {
                warn!("event=task_list module=service status=error completed={completed} error={err}");
                Err(err.into())
            }
        }
    }
}
