//! Domain model for to-do tasks.
//!
//! # Responsibility
//! - Define the canonical task record shared by storage and transport.
//!
//! # Invariants
//! - Every task is identified by a stable, non-nil `TaskId`.
//! - There is no delete state; tasks persist once created.

pub mod task;
