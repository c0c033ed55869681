// src/exec/task_runner.rs

//! Individual task runner.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::actions::{ActionContext, BuildAction};
use crate::dag::ScheduledTask;
use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::reload::ReloadChannel;

/// Run a single task's action and emit its `TaskCompleted` event.
///
/// The action runs on the blocking pool. On success the written files are
/// announced on the reload channel. Composite tasks (no action) succeed
/// immediately.
pub async fn run_task(
    task: ScheduledTask,
    action: Option<Arc<dyn BuildAction>>,
    ctx: Arc<ActionContext>,
    reload: ReloadChannel,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let outcome = match action {
        None => {
            debug!(task = %task.name, run_id = task.run_id, "composite task; nothing to run");
            TaskOutcome::Success
        }
        Some(action) => run_action(&task, action, ctx, &reload).await,
    };

    if runtime_tx
        .send(RuntimeEvent::TaskCompleted {
            task: task.name.clone(),
            outcome,
        })
        .await
        .is_err()
    {
        debug!(task = %task.name, "runtime gone; dropping completion");
    }
}

async fn run_action(
    task: &ScheduledTask,
    action: Arc<dyn BuildAction>,
    ctx: Arc<ActionContext>,
    reload: &ReloadChannel,
) -> TaskOutcome {
    info!(task = %task.name, run_id = task.run_id, "starting task");
    let started = Instant::now();

    let joined = tokio::task::spawn_blocking(move || action.run(&ctx)).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match joined {
        Ok(Ok(written)) => {
            info!(
                task = %task.name,
                run_id = task.run_id,
                files = written.len(),
                elapsed_ms,
                "task finished"
            );
            reload.notify(&task.name, &written);
            TaskOutcome::Success
        }
        Ok(Err(err)) => {
            error!(task = %task.name, run_id = task.run_id, error = %err, "task failed");
            TaskOutcome::Failed
        }
        Err(join_err) => {
            error!(
                task = %task.name,
                run_id = task.run_id,
                error = %join_err,
                "task panicked or was cancelled"
            );
            TaskOutcome::Failed
        }
    }
}
