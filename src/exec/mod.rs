// src/exec/mod.rs

//! Action execution layer.
//!
//! This module runs the build actions of scheduled tasks and reports back to
//! the orchestration runtime via `RuntimeEvent`s.
//!
//! - [`backend`] provides the `ExecutorBackend` trait and the production
//!   `ActionExecutor`; tests replace it with a fake implementation.
//! - [`task_runner`] runs a single task's action on the blocking pool.

pub mod backend;
pub mod task_runner;

pub use backend::{ActionExecutor, ExecutorBackend};
pub use task_runner::run_task;
