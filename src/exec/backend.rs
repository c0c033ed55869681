// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of running actions
//! itself. This makes it easy to swap in a fake executor in tests while
//! keeping the production implementation here.
//!
//! - `ActionExecutor` is the implementation used by `sitebuild`. It spawns one
//!   tokio task per scheduled task, which runs the action and reports
//!   `TaskCompleted`.
//! - Tests can provide their own `ExecutorBackend` that, for example, records
//!   which tasks were scheduled and directly emits `TaskCompleted` events.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::actions::ActionContext;
use crate::dag::{ScheduledTask, TaskRegistry};
use crate::engine::RuntimeEvent;
use crate::errors::Result;
use crate::reload::ReloadChannel;

use super::task_runner::run_task;

/// Trait abstracting how scheduled tasks are executed.
pub trait ExecutorBackend: Send {
    /// Dispatch the given tasks for execution.
    ///
    /// The implementation is free to:
    /// - run the registered build actions (production)
    /// - simulate completion and emit `RuntimeEvent`s (tests)
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production executor: looks each task up in the registry and runs its
/// action.
pub struct ActionExecutor {
    registry: Arc<TaskRegistry>,
    ctx: Arc<ActionContext>,
    reload: ReloadChannel,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl ActionExecutor {
    pub fn new(
        registry: Arc<TaskRegistry>,
        ctx: ActionContext,
        reload: ReloadChannel,
        runtime_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            registry,
            ctx: Arc::new(ctx),
            reload,
            runtime_tx,
        }
    }
}

impl ExecutorBackend for ActionExecutor {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        for task in tasks {
            let action = self
                .registry
                .get(&task.name)
                .and_then(|t| t.action.clone());
            tokio::spawn(run_task(
                task,
                action,
                Arc::clone(&self.ctx),
                self.reload.clone(),
                self.runtime_tx.clone(),
            ));
        }
        Box::pin(async { Ok(()) })
    }
}
