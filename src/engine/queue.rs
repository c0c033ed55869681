// src/engine/queue.rs

use std::collections::BTreeSet;

use tracing::debug;

use super::TaskName;

/// Triggers that arrive for tasks already taking part in the active run.
///
/// Such a trigger must not interrupt or double-run the task, so it waits
/// here until the active run finishes. All waiting triggers coalesce into a
/// single batch: five saves of the same stylesheet during one rebuild cause
/// one follow-up rebuild, not five.
#[derive(Debug, Default)]
pub struct TriggerQueue {
    pending: BTreeSet<TaskName>,
}

impl TriggerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remember that `task` should run again once the active run is over.
    pub fn record_trigger(&mut self, task: &str) {
        let inserted = self.pending.insert(task.to_string());
        debug!(task = %task, inserted, "queued trigger behind active run");
    }

    /// Take every queued task name (sorted), leaving the queue empty.
    pub fn drain_pending(&mut self) -> Vec<TaskName> {
        let tasks: Vec<TaskName> = std::mem::take(&mut self.pending).into_iter().collect();
        debug!(drained = tasks.len(), "drained queued triggers into new run");
        tasks
    }
}
