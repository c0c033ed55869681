// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use crate::dag::{ScheduledTask, Scheduler, SchedulerStep, TaskRunState};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RunReport, RuntimeOptions, TaskName, TaskOutcome, TriggerReason};
use tracing::{debug, info, warn};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Send these tasks to the executor.
    DispatchTasks(Vec<ScheduledTask>),
    /// The runtime is idle and was asked to exit when idle.
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Handle a task trigger event.
///
/// - Idle scheduler: start a new run with this trigger plus anything queued.
/// - Active run, task not in it: merge the task into the active run.
/// - Active run, task already in it: a file-watch trigger is queued for a
///   follow-up run; a manual trigger is redundant and dropped.
pub fn handle_task_trigger(
    scheduler: &mut Scheduler,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    report: &mut RunReport,
    task: TaskName,
    reason: TriggerReason,
) -> CoreStep {
    let mut commands = Vec::new();

    if scheduler.is_idle() {
        let mut triggers: Vec<(TaskName, TriggerReason)> = queue
            .drain_pending()
            .into_iter()
            .filter(|queued| *queued != task)
            .map(|queued| (queued, TriggerReason::FileWatch))
            .collect();
        triggers.push((task, reason));

        commands.extend(start_new_run_from_triggers(scheduler, report, triggers));
        return exit_if_idle(scheduler, queue, options, report, commands);
    }

    match scheduler.run_state_of(&task) {
        None => {
            warn!(task = %task, "trigger for unknown task; ignoring");
        }
        Some(TaskRunState::NotInRun) => {
            let step = apply_trigger(scheduler, &task, reason);
            commands.extend(record_step(report, step));
        }
        Some(_already_in_run) => match reason {
            TriggerReason::FileWatch => queue.record_trigger(&task),
            TriggerReason::Manual => {
                debug!(task = %task, "manual trigger for task already in run; ignoring");
            }
        },
    }

    exit_if_idle(scheduler, queue, options, report, commands)
}

/// Handle a task completion event.
pub fn handle_task_completion(
    scheduler: &mut Scheduler,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    report: &mut RunReport,
    task: TaskName,
    outcome: TaskOutcome,
) -> CoreStep {
    let step = scheduler.step_completion(&task, outcome);
    if outcome == TaskOutcome::Success && !step.newly_failed.contains(&task) {
        report.succeeded.push(task);
    }

    let mut commands = record_step(report, step);
    commands.extend(maybe_start_queued_run(scheduler, queue, report));

    exit_if_idle(scheduler, queue, options, report, commands)
}

/// Once the DAG is idle and nothing is queued, either stop (exit-when-idle
/// mode) or close out the finished run.
///
/// A trigger can also leave the scheduler idle (every task blocked), so this
/// is checked after triggers as well as after completions.
fn exit_if_idle(
    scheduler: &Scheduler,
    queue: &TriggerQueue,
    options: &RuntimeOptions,
    report: &mut RunReport,
    mut commands: Vec<CoreCommand>,
) -> CoreStep {
    if !scheduler.is_idle() || !queue.is_empty() {
        return CoreStep::running(commands);
    }
    if options.exit_when_idle {
        commands.push(CoreCommand::RequestExit);
        return CoreStep {
            commands,
            keep_running: false,
        };
    }
    settle_finished_run(report);
    CoreStep::running(commands)
}

/// Log a finished watch-mode run and drop its entries.
///
/// Nothing takes the report between runs while watching, so it would
/// otherwise grow with every rebuild.
fn settle_finished_run(report: &mut RunReport) {
    if report.succeeded.is_empty() && report.failed.is_empty() {
        return;
    }
    let finished = std::mem::take(report);
    report.interrupted = finished.interrupted;

    if finished.is_success() {
        info!(succeeded = ?finished.succeeded, "rebuild finished");
    } else {
        warn!(
            failed = ?finished.failed,
            succeeded = ?finished.succeeded,
            "rebuild finished with failures"
        );
    }
}

/// Start a fresh run seeded with `triggers`.
///
/// This mirrors what the async runtime does at startup, but is pure and
/// returns commands instead of performing IO.
pub fn start_new_run_from_triggers(
    scheduler: &mut Scheduler,
    report: &mut RunReport,
    triggers: Vec<(TaskName, TriggerReason)>,
) -> Vec<CoreCommand> {
    if triggers.is_empty() {
        return Vec::new();
    }

    scheduler.start_new_run();

    let mut commands = Vec::new();
    for (task, reason) in triggers {
        let step = apply_trigger(scheduler, &task, reason);
        commands.extend(record_step(report, step));
    }
    commands
}

fn apply_trigger(scheduler: &mut Scheduler, task: &str, reason: TriggerReason) -> SchedulerStep {
    match reason {
        TriggerReason::Manual => scheduler.step_build(task),
        TriggerReason::FileWatch => scheduler.step_trigger(task),
    }
}

fn record_step(report: &mut RunReport, step: SchedulerStep) -> Vec<CoreCommand> {
    report.failed.extend(step.newly_failed);
    if step.newly_scheduled.is_empty() {
        Vec::new()
    } else {
        vec![CoreCommand::DispatchTasks(step.newly_scheduled)]
    }
}

/// If the scheduler is idle and there are queued triggers, start a new run.
fn maybe_start_queued_run(
    scheduler: &mut Scheduler,
    queue: &mut TriggerQueue,
    report: &mut RunReport,
) -> Vec<CoreCommand> {
    if !scheduler.is_idle() || queue.is_empty() {
        return Vec::new();
    }

    let triggers = queue
        .drain_pending()
        .into_iter()
        .map(|task| (task, TriggerReason::FileWatch))
        .collect();
    start_new_run_from_triggers(scheduler, report, triggers)
}
