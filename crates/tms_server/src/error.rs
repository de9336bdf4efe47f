//! Boundary error type: every failure leaves the process as an envelope.

use crate::response::FailureResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use std::fmt::{Display, Formatter};
use tms_core::ServiceError;

pub const TASK_NOT_FOUND: &str = "Task not found";

/// Failure reported to HTTP callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed or invalid request input.
    BadRequest(String),
    NotFound(String),
    /// Storage failed; details stay in the logs.
    Storage(String),
    /// Storage did not answer within the configured bound.
    Timeout(String),
    /// Known path, unsupported method.
    MethodNotAllowed(String),
}

/// Outcome of a storage call dispatched from a handler.
#[derive(Debug)]
pub enum CallError {
    Service(ServiceError),
    Timeout,
    Aborted(String),
}

impl ApiError {
    /// Maps a failed storage call, using `failure_message` for errors whose
    /// details must not reach the caller.
    pub fn from_call(err: CallError, operation: &'static str, failure_message: &str) -> Self {
        match err {
            CallError::Service(ServiceError::Validation(err)) => Self::BadRequest(err.to_string()),
            CallError::Service(ServiceError::NotFound(_)) => {
                Self::NotFound(TASK_NOT_FOUND.to_string())
            }
            CallError::Service(ServiceError::Repo(err)) => {
                error!("event={operation} module=http status=error error_code=storage_failed error={err}");
                Self::Storage(failure_message.to_string())
            }
            CallError::Timeout => {
                error!("event={operation} module=http status=error error_code=storage_timeout");
                Self::Timeout(format!("{failure_message}: storage timed out"))
            }
            CallError::Aborted(details) => {
                error!("event={operation} module=http status=error error_code=storage_aborted error={details}");
                Self::Storage(failure_message.to_string())
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(message)
            | Self::NotFound(message)
            | Self::Storage(message)
            | Self::Timeout(message)
            | Self::MethodNotAllowed(message) => message,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status().as_u16(), self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = FailureResponse::new(self.message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiError, CallError, TASK_NOT_FOUND};
    use axum::http::StatusCode;
    use tms_core::{RepoError, ServiceError, TaskValidationError};
    use uuid::Uuid;

    #[test]
    fn validation_errors_keep_their_reason() {
        let err = ApiError::from_call(
            CallError::Service(ServiceError::Validation(TaskValidationError::EmptyTitle)),
            "task_create",
            "Failed to create task",
        );
        assert_eq!(err, ApiError::BadRequest("title cannot be empty".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_uses_fixed_message() {
        let err = ApiError::from_call(
            CallError::Service(ServiceError::NotFound(Uuid::new_v4())),
            "task_toggle",
            "Failed to update task",
        );
        assert_eq!(err.message(), TASK_NOT_FOUND);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn storage_details_are_hidden() {
        let err = ApiError::from_call(
            CallError::Service(ServiceError::Repo(RepoError::InvalidData(
                "secret detail".to_string(),
            ))),
            "task_list",
            "Failed to fetch completed tasks",
        );
        assert_eq!(
            err,
            ApiError::Storage("Failed to fetch completed tasks".to_string())
        );
    }

    #[test]
    fn timeouts_map_to_gateway_timeout() {
        let err = ApiError::from_call(CallError::Timeout, "task_toggle", "Failed to update task");
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(err.message().starts_with("Failed to update task"));
    }
}
