//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for tasks.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories assign task identity at creation.
//! - Toggle is a single atomic storage operation per task id.
//! - Repository APIs return semantic errors (`NotFound`) in addition to
//!   transport errors.

pub mod memory_repo;
pub mod task_repo;
