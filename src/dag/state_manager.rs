// src/dag/state_manager.rs

//! Per-run state management for tasks in the scheduler.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, warn};

use crate::dag::DagGraph;
use crate::dag::task_info::{RunState, ScheduledTask, TaskInfo};
use crate::engine::TaskName;

/// Manages per-run state transitions for tasks.
pub struct StateManager<'a> {
    graph: &'a DagGraph,
    tasks: &'a mut BTreeMap<TaskName, TaskInfo>,
    current_run_id: Option<u64>,
}

impl<'a> StateManager<'a> {
    pub fn new(
        graph: &'a DagGraph,
        tasks: &'a mut BTreeMap<TaskName, TaskInfo>,
        current_run_id: Option<u64>,
    ) -> Self {
        Self {
            graph,
            tasks,
            current_run_id,
        }
    }

    /// Include a single task in this run, leaving its prerequisites out.
    ///
    /// Prerequisites outside the run are judged by their history (see
    /// [`ReadOnlyStateManager::deps_satisfied_for_info`]).
    pub fn mark_pending(&mut self, name: &str) {
        if let Some(info) = self.tasks.get_mut(name) {
            if info.run_state.is_none() {
                info.run_state = Some(RunState::Pending);
                debug!(task = %info.name, "marked Pending for this run");
            }
        } else {
            warn!(task = %name, "node in DAG not present in tasks map");
        }
    }

    /// Include a task and its full prerequisite closure in this run.
    ///
    /// Tasks already participating in the run keep their current state.
    pub fn mark_with_prerequisites_pending(&mut self, root: &str) {
        let mut stack: Vec<TaskName> = vec![root.to_string()];
        let mut visited: HashSet<TaskName> = HashSet::new();

        while let Some(name) = stack.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            self.mark_pending(&name);
            stack.extend(self.graph.dependencies_of(&name).iter().cloned());
        }
    }

    pub fn deps_satisfied_for_info(&self, info: &TaskInfo) -> bool {
        ReadOnlyStateManager::new(self.tasks).deps_satisfied_for_info(info)
    }

    /// Mark all dependents in this run (transitively) of a failed task as
    /// `DoneFailed`.
    ///
    /// Returns the newly failed names, excluding `failed_task` itself.
    pub fn mark_dependents_failed(&mut self, failed_task: &str) -> Vec<TaskName> {
        let mut stack: Vec<TaskName> = self.graph.dependents_of(failed_task).to_vec();
        let mut newly_failed = Vec::new();

        while let Some(name) = stack.pop() {
            if let Some(info) = self.tasks.get_mut(&name) {
                match info.run_state {
                    Some(RunState::Pending) | Some(RunState::Running) => {
                        info.run_state = Some(RunState::DoneFailed);
                        debug!(
                            task = %info.name,
                            upstream = %failed_task,
                            "marking dependent as DoneFailed due to upstream failure"
                        );
                        newly_failed.push(info.name.clone());
                        stack.extend(self.graph.dependents_of(&name).iter().cloned());
                    }
                    Some(RunState::DoneSuccess) | Some(RunState::DoneFailed) | None => {}
                }
            }
        }

        newly_failed
    }

    /// Collect tasks that are `Pending` and whose prerequisites are satisfied,
    /// mark them as `Running`, and return them as `ScheduledTask`s.
    pub fn collect_new_ready_tasks(&mut self) -> Vec<ScheduledTask> {
        let candidates: Vec<TaskName> = self
            .tasks
            .values()
            .filter(|info| {
                matches!(info.run_state, Some(RunState::Pending))
                    && self.deps_satisfied_for_info(info)
            })
            .map(|info| info.name.clone())
            .collect();

        let mut ready = Vec::with_capacity(candidates.len());
        for name in candidates {
            if let Some(info) = self.tasks.get_mut(&name) {
                let is_rerun = info.last_successful_run.is_some() || info.last_failed_run.is_some();
                if is_rerun {
                    info!(task = %info.name, run_id = self.current_run_id, "scheduling task (re-run)");
                } else {
                    info!(task = %info.name, run_id = self.current_run_id, "scheduling task");
                }

                info.run_state = Some(RunState::Running);
                ready.push(ScheduledTask::from_task_info(
                    info,
                    self.current_run_id.unwrap_or(0),
                ));
            }
        }

        ready
    }

    /// Fail every `Pending` task when nothing is `Running`.
    ///
    /// At that point no future completion can satisfy them (a prerequisite
    /// outside the run that never succeeded, for example), and leaving them
    /// pending would keep the run open forever.
    pub fn fail_blocked_tasks(&mut self) -> Vec<TaskName> {
        let any_running = self
            .tasks
            .values()
            .any(|info| matches!(info.run_state, Some(RunState::Running)));
        if any_running {
            return Vec::new();
        }

        let mut blocked = Vec::new();
        for info in self.tasks.values_mut() {
            if matches!(info.run_state, Some(RunState::Pending)) {
                warn!(
                    task = %info.name,
                    run_id = self.current_run_id,
                    "task blocked by prerequisites that did not succeed; marking failed"
                );
                info.run_state = Some(RunState::DoneFailed);
                if let Some(run_id) = self.current_run_id {
                    info.last_failed_run = Some(run_id);
                }
                blocked.push(info.name.clone());
            }
        }
        blocked
    }

    pub fn all_tasks_terminal(&self) -> bool {
        !self.tasks.values().any(|info| {
            matches!(
                info.run_state,
                Some(RunState::Pending) | Some(RunState::Running)
            )
        })
    }
}

/// Read-only view for checking prerequisite satisfaction.
pub struct ReadOnlyStateManager<'a> {
    tasks: &'a BTreeMap<TaskName, TaskInfo>,
}

impl<'a> ReadOnlyStateManager<'a> {
    pub fn new(tasks: &'a BTreeMap<TaskName, TaskInfo>) -> Self {
        Self { tasks }
    }

    /// Whether all prerequisites of `info` are satisfied for the current run.
    ///
    /// A prerequisite in the run must have succeeded in the run; one outside
    /// the run must have succeeded in some earlier run.
    pub fn deps_satisfied_for_info(&self, info: &TaskInfo) -> bool {
        for dep_name in &info.deps {
            let Some(dep) = self.tasks.get(dep_name) else {
                warn!(
                    task = %info.name,
                    dep = %dep_name,
                    "dependency missing from tasks map"
                );
                return false;
            };

            match dep.run_state {
                Some(RunState::DoneSuccess) => {}
                Some(RunState::DoneFailed)
                | Some(RunState::Pending)
                | Some(RunState::Running) => return false,
                None => {
                    if dep.last_successful_run.is_none() {
                        return false;
                    }
                }
            }
        }

        true
    }
}
