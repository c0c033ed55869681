// src/reload/channel.rs

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::actions::WrittenFileSet;

const CHANNEL_CAPACITY: usize = 64;

/// What a browser is told after an action wrote files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadEvent {
    pub task: String,
    /// Written paths, relative to the destination root, sorted.
    pub files: Vec<String>,
    /// Digest over the written set; equal sets give equal identities.
    pub identity: String,
}

/// Fire-and-forget fan-out of [`ReloadEvent`]s.
///
/// Cloning is cheap and every clone feeds the same subscribers.
#[derive(Debug, Clone)]
pub struct ReloadChannel {
    tx: broadcast::Sender<ReloadEvent>,
}

impl Default for ReloadChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadChannel {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Tell subscribers that `task` wrote `written`.
    ///
    /// Empty sets are not announced. Having no subscribers is not an error.
    pub fn notify(&self, task: &str, written: &WrittenFileSet) {
        if written.is_empty() {
            return;
        }

        let event = ReloadEvent {
            task: task.to_string(),
            files: written.paths(),
            identity: written.identity(),
        };
        match self.tx.send(event) {
            Ok(receivers) => debug!(task, receivers, "reload event sent"),
            Err(_) => debug!(task, "no reload subscribers"),
        }
    }
}
