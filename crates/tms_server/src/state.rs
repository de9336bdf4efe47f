//! Shared handler state: one task service for the whole process.

use crate::error::CallError;
use std::sync::Arc;
use std::time::Duration;
use tms_core::{ServiceResult, TaskRepository, TaskService};

pub type DynTaskRepository = Box<dyn TaskRepository>;

/// Cheap to clone; every clone shares the same service.
#[derive(Clone)]
pub struct AppState {
    service: Arc<TaskService<DynTaskRepository>>,
    storage_timeout: Duration,
}

impl AppState {
    pub fn new(repo: DynTaskRepository, storage_timeout: Duration) -> Self {
        Self {
            service: Arc::new(TaskService::new(repo)),
            storage_timeout,
        }
    }

    /// Runs a blocking service call on the blocking pool, bounded by the
    /// storage timeout.
    ///
    /// A call that times out keeps running to completion in the background;
    /// its write either lands or fails inside storage.
    pub async fn call<T, F>(&self, op: F) -> Result<T, CallError>
    where
        T: Send + 'static,
        F: FnOnce(&TaskService<DynTaskRepository>) -> ServiceResult<T> + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        let handle = tokio::task::spawn_blocking(move || op(&service));

        match tokio::time::timeout(self.storage_timeout, handle).await {
            Err(_) => Err(CallError::Timeout),
            Ok(Err(join_err)) => Err(CallError::Aborted(join_err.to_string())),
            Ok(Ok(result)) => result.map_err(CallError::Service),
        }
    }
}
