//! HTTP front end for the task service.
//!
//! Wires configuration, storage bootstrap and the axum router around
//! `tms_core::TaskService`.

pub mod config;
pub mod error;
pub mod request_log;
pub mod response;
pub mod routes;
pub mod state;
pub mod storage;

pub use config::{ServerConfig, StorageKind};
pub use error::ApiError;
pub use response::{ApiResponse, FailureResponse};
pub use routes::{router, ApiDoc};
pub use state::AppState;
