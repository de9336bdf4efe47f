//! Task domain model.
//!
//! # Responsibility
//! - Define the task record and its JSON wire shape.
//! - Own title normalization and record validation.
//!
//! # Invariants
//! - `id` is assigned by storage, never nil, and never reused.
//! - `title` is trimmed, non-empty and at most `MAX_TITLE_CHARS` characters.
//! - `is_completed` starts as `false` and only changes through toggle.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use utoipa::ToSchema;
use uuid::Uuid;

/// Upper bound on title length, counted in characters.
pub const MAX_TITLE_CHARS: usize = 500;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Validation failures for task records and user-provided titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    NilId,
    EmptyTitle,
    TitleTooLong { max: usize, actual: usize },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "task id cannot be nil"),
            Self::EmptyTitle => write!(f, "title cannot be empty"),
            Self::TitleTooLong { max, actual } => {
                write!(f, "title is too long ({actual} characters, max {max})")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical to-do record.
///
/// Serialized as `{ "id", "title", "isCompleted" }`. Deserialization runs
/// [`Task::validate`], so invalid payloads never become a `Task`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", try_from = "TaskWire")]
pub struct Task {
    #[schema(value_type = Uuid)]
    pub id: TaskId,
    #[schema(example = "Buy milk")]
    pub title: String,
    pub is_completed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskWire {
    id: TaskId,
    title: String,
    is_completed: bool,
}

impl TryFrom<TaskWire> for Task {
    type Error = TaskValidationError;

    fn try_from(value: TaskWire) -> Result<Self, Self::Error> {
        let task = Task {
            id: value.id,
            title: value.title,
            is_completed: value.is_completed,
        };
        task.validate()?;
        Ok(task)
    }
}

impl Task {
    /// Builds a fresh, incomplete task with a newly generated id.
    ///
    /// Used by repositories when they assign identity at creation.
    pub fn new(title: &str) -> Result<Self, TaskValidationError> {
        Self::with_id(Uuid::new_v4(), title)
    }

    /// Builds an incomplete task with a caller-provided id.
    ///
    /// # Errors
    /// - `NilId` when `id` is nil.
    /// - Title errors from [`normalize_title`].
    pub fn with_id(id: TaskId, title: &str) -> Result<Self, TaskValidationError> {
        let task = Self {
            id,
            title: normalize_title(title)?,
            is_completed: false,
        };
        task.validate()?;
        Ok(task)
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        validate_title(&self.title)
    }
}

/// Trims a user-provided title and validates the result.
pub fn normalize_title(raw: &str) -> Result<String, TaskValidationError> {
    let trimmed = raw.trim();
    validate_title(trimmed)?;
    Ok(trimmed.to_string())
}

fn validate_title(title: &str) -> Result<(), TaskValidationError> {
    if title.trim().is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    let actual = title.chars().count();
    if actual > MAX_TITLE_CHARS {
        return Err(TaskValidationError::TitleTooLong {
            max: MAX_TITLE_CHARS,
            actual,
        });
    }
    Ok(())
}
