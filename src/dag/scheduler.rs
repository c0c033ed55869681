// src/dag/scheduler.rs

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::dag::graph::DagGraph;
use crate::dag::registry::TaskRegistry;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::state_manager::{ReadOnlyStateManager, StateManager};
use crate::dag::task_info::{RunState, ScheduledTask, TaskInfo, TaskRunState};
use crate::engine::{TaskName, TaskOutcome};

/// Scheduler holds the immutable DAG plus mutable per-run state.
///
/// It is responsible for:
/// - remembering which tasks are part of the current run
/// - deciding when a task is ready (all prerequisites satisfied)
/// - recording success/failure and scheduling or failing dependents
/// - closing the run once every participating task is terminal
#[derive(Debug)]
pub struct Scheduler {
    graph: DagGraph,
    tasks: BTreeMap<TaskName, TaskInfo>,
    /// Monotonically increasing run ID.
    run_counter: u64,
    /// Currently active run ID, or `None` if there is no active run.
    current_run_id: Option<u64>,
}

impl Scheduler {
    /// Construct a scheduler from a validated [`TaskRegistry`].
    pub fn from_registry(registry: &TaskRegistry) -> Self {
        let graph = DagGraph::from_registry(registry);
        let tasks = registry
            .tasks()
            .map(|task| (task.name.clone(), TaskInfo::from_task(task)))
            .collect();

        Self {
            graph,
            tasks,
            run_counter: 0,
            current_run_id: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.current_run_id.is_none()
    }

    pub fn current_run_id(&self) -> Option<u64> {
        self.current_run_id
    }

    /// Read-only view of the given task's run state.
    pub fn run_state_of(&self, task: &str) -> Option<TaskRunState> {
        let info = self.tasks.get(task)?;
        Some(info.run_state.into())
    }

    /// Names of tasks participating in the active run (empty when idle).
    pub fn tasks_in_current_run(&self) -> Vec<TaskName> {
        if self.current_run_id.is_none() {
            return Vec::new();
        }

        self.tasks
            .values()
            .filter(|info| info.run_state.is_some())
            .map(|info| info.name.clone())
            .collect()
    }

    /// Whether the prerequisites of `task` are satisfied for the current run.
    ///
    /// Returns `None` if the task is unknown.
    pub fn deps_satisfied(&self, task: &str) -> Option<bool> {
        let info = self.tasks.get(task)?;
        Some(ReadOnlyStateManager::new(&self.tasks).deps_satisfied_for_info(info))
    }

    /// Start a new run, resetting per-run state but keeping history.
    pub fn start_new_run(&mut self) {
        self.run_counter += 1;
        self.current_run_id = Some(self.run_counter);

        for info in self.tasks.values_mut() {
            info.run_state = None;
        }

        debug!(run_id = self.run_counter, "scheduler: starting new run");
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.graph.tasks()
    }

    /// Add `task` and all of its prerequisites to the run (production API).
    pub fn handle_build(&mut self, task: &str) -> Vec<ScheduledTask> {
        self.build_step_internal(task).newly_scheduled
    }

    /// Add only `task` to the run (production API).
    pub fn handle_trigger(&mut self, task: &str) -> Vec<ScheduledTask> {
        self.trigger_step_internal(task).newly_scheduled
    }

    /// Record a finished task (production API).
    pub fn handle_completion(&mut self, task: &str, outcome: TaskOutcome) -> Vec<ScheduledTask> {
        self.completion_step_internal(task, outcome).newly_scheduled
    }

    /// Manual-step variant of `handle_build`.
    pub fn step_build(&mut self, task: &str) -> SchedulerStep {
        self.build_step_internal(task)
    }

    /// Manual-step variant of `handle_trigger`.
    pub fn step_trigger(&mut self, task: &str) -> SchedulerStep {
        self.trigger_step_internal(task)
    }

    /// Manual-step variant of `handle_completion`.
    pub fn step_completion(&mut self, task: &str, outcome: TaskOutcome) -> SchedulerStep {
        self.completion_step_internal(task, outcome)
    }

    fn ensure_run(&mut self, task: &str) {
        if self.current_run_id.is_none() {
            warn!(
                task = %task,
                "trigger with no active run; implicitly starting a new run"
            );
            self.start_new_run();
        }
    }

    fn build_step_internal(&mut self, task: &str) -> SchedulerStep {
        self.ensure_run(task);

        if self.tasks.contains_key(task) {
            StateManager::new(&self.graph, &mut self.tasks, self.current_run_id)
                .mark_with_prerequisites_pending(task);
        } else {
            warn!(task = %task, "build request for unknown task; ignoring");
        }

        self.advance(SchedulerStep::default())
    }

    fn trigger_step_internal(&mut self, task: &str) -> SchedulerStep {
        self.ensure_run(task);

        if self.tasks.contains_key(task) {
            StateManager::new(&self.graph, &mut self.tasks, self.current_run_id)
                .mark_pending(task);
        } else {
            warn!(task = %task, "trigger for unknown task; ignoring");
        }

        self.advance(SchedulerStep::default())
    }

    fn completion_step_internal(&mut self, task: &str, outcome: TaskOutcome) -> SchedulerStep {
        let Some(run_id) = self.current_run_id else {
            warn!(task = %task, "completion with no active run; ignoring");
            return SchedulerStep::default();
        };

        let mut step = SchedulerStep::default();

        match self.tasks.get_mut(task) {
            Some(info) if info.run_state == Some(RunState::Running) => match outcome {
                TaskOutcome::Success => {
                    info.run_state = Some(RunState::DoneSuccess);
                    info.last_successful_run = Some(run_id);
                    debug!(task = %info.name, run_id, "task completed successfully");
                }
                TaskOutcome::Failed => {
                    info.run_state = Some(RunState::DoneFailed);
                    info.last_failed_run = Some(run_id);
                    warn!(task = %info.name, run_id, "task failed; failing dependents in this run");
                    step.newly_failed.push(info.name.clone());
                    let mut manager =
                        StateManager::new(&self.graph, &mut self.tasks, self.current_run_id);
                    step.newly_failed.append(&mut manager.mark_dependents_failed(task));
                }
            },
            Some(info) => {
                warn!(
                    task = %task,
                    state = ?info.run_state,
                    "completion for task that is not running; ignoring"
                );
                return step;
            }
            None => {
                warn!(task = %task, "completion for unknown task; ignoring");
                return step;
            }
        }

        self.advance(step)
    }

    /// Schedule whatever became ready, fail what can no longer run, and close
    /// the run when everything is terminal.
    fn advance(&mut self, mut step: SchedulerStep) -> SchedulerStep {
        let mut manager = StateManager::new(&self.graph, &mut self.tasks, self.current_run_id);
        step.newly_scheduled.extend(manager.collect_new_ready_tasks());
        step.newly_failed.extend(manager.fail_blocked_tasks());
        step.run_just_finished = self.maybe_finish_run();
        step
    }

    /// Returns `true` if this call transitioned the scheduler to idle.
    fn maybe_finish_run(&mut self) -> bool {
        if self.current_run_id.is_none() {
            return false;
        }

        let manager = StateManager::new(&self.graph, &mut self.tasks, self.current_run_id);
        if manager.all_tasks_terminal() {
            info!(
                run_id = self.current_run_id,
                "scheduler: all tasks terminal; run finished"
            );
            self.current_run_id = None;
            true
        } else {
            false
        }
    }
}
