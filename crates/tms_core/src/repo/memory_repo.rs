//! In-memory task repository.
//!
//! Keeps tasks in insertion order behind one lock. Every operation, including
//! toggle, completes while holding that lock.

use crate::model::task::{Task, TaskId};
use crate::repo::task_repo::{RepoError, RepoResult, TaskListQuery, TaskRepository};
use parking_lot::Mutex;

/// Volatile repository for tests and `memory` storage mode.
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    tasks: Mutex<Vec<Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn create_task(&self, title: &str) -> RepoResult<Task> {
        let task = Task::new(title)?;
        self.tasks.lock().push(task.clone());
        Ok(task)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let tasks = self.tasks.lock();
        Ok(tasks
            .iter()
            .filter(|task| query.completed.map_or(true, |c| task.is_completed == c))
            .cloned()
            .collect())
    }

    fn toggle_task(&self, id: TaskId) -> RepoResult<Task> {
        let mut tasks = self.tasks.lock();
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(RepoError::NotFound(id))?;
        task.is_completed = !task.is_completed;
        Ok(task.clone())
    }
}
