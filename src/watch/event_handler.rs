// src/watch/event_handler.rs

//! Event processing logic for file system changes.

use std::path::Path;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{RuntimeEvent, TaskName, TriggerReason};
use crate::fs::FileSystem;
use crate::watch::cache::FileCache;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::WatchBinding;

/// Tasks bound to `rel_path`, deduplicated, in binding order.
pub fn tasks_for_path(bindings: &[WatchBinding], rel_path: &str) -> Vec<TaskName> {
    let mut tasks: Vec<TaskName> = Vec::new();
    for binding in bindings.iter().filter(|b| b.matches(rel_path)) {
        for task in binding.tasks() {
            if !tasks.contains(task) {
                tasks.push(task.clone());
            }
        }
    }
    tasks
}

/// Process a single changed path and trigger the bound tasks.
///
/// This function:
/// 1. Relativizes the path against the project root
/// 2. Finds the bound tasks; nothing bound means nothing to do
/// 3. Drops the event if the file content is unchanged since last seen
/// 4. Sends one `FileWatch` trigger per task
///
/// Returns `false` once the runtime has gone away.
pub async fn process_file_change(
    fs: &dyn FileSystem,
    root: &Path,
    path: &Path,
    bindings: &[WatchBinding],
    cache: &mut FileCache,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> bool {
    if fs.is_dir(path) {
        return true;
    }

    let Some(rel) = relative_str(fs, root, path) else {
        warn!(path = %path.display(), root = %root.display(), "event outside project root");
        return true;
    };

    let tasks = tasks_for_path(bindings, &rel);
    if tasks.is_empty() {
        return true;
    }

    if fs.is_file(path) {
        match cache.changed(fs, path) {
            Ok(false) => {
                debug!(path = %rel, "content unchanged; not triggering");
                return true;
            }
            Ok(true) => {}
            Err(err) => {
                warn!(path = %rel, error = %err, "failed to hash changed file; triggering anyway");
            }
        }
    } else {
        cache.forget(path);
    }

    for task in tasks {
        debug!(task = %task, path = %rel, "watch match -> triggering task");
        if runtime_tx
            .send(RuntimeEvent::TaskTriggered {
                task,
                reason: TriggerReason::FileWatch,
            })
            .await
            .is_err()
        {
            warn!("runtime channel closed; stopping watcher");
            return false;
        }
    }
    true
}
