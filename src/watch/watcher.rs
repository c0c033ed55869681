// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::fs::FileSystem;
use crate::watch::cache::FileCache;
use crate::watch::event_handler::process_file_change;
use crate::watch::patterns::{WatchBinding, collect_matching_files};

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher over the base directories of `bindings` and
/// send `RuntimeEvent::TaskTriggered` for tasks bound to a changed path.
///
/// - `root` is the project root against which all globs are evaluated.
/// - `runtime_tx` is the channel into the main runtime.
pub fn spawn_watcher(
    fs: Arc<dyn FileSystem>,
    root: impl Into<PathBuf>,
    bindings: Vec<WatchBinding>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = fs.canonicalize(&root).unwrap_or(root);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if event_tx.send(event).is_err() {
                    debug!("watch event loop gone; dropping notify event");
                }
            }
            Err(err) => warn!(error = %err, "file watch error"),
        },
        Config::default(),
    )?;

    let mut bases: Vec<PathBuf> = bindings.iter().map(|b| root.join(b.base())).collect();
    bases.sort();
    bases.dedup();
    for base in &bases {
        if !fs.is_dir(base) {
            warn!(dir = %base.display(), "watch directory does not exist; skipping");
            continue;
        }
        watcher.watch(base, RecursiveMode::Recursive)?;
        info!(dir = %base.display(), "watching");
    }

    let mut cache = FileCache::new();
    for binding in &bindings {
        match collect_matching_files(fs.as_ref(), &root, binding.glob()) {
            Ok(files) => {
                for file in files {
                    if let Err(err) = cache.prime(fs.as_ref(), &file.path) {
                        debug!(error = %err, "could not prime digest");
                    }
                }
            }
            Err(err) => warn!(glob = binding.glob(), error = %err, "could not list watched files"),
        }
    }
    debug!(files = cache.len(), "primed watch cache");

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if matches!(event.kind, EventKind::Access(_)) {
                continue;
            }
            debug!(?event, "received notify event");

            for path in &event.paths {
                let keep_going = process_file_change(
                    fs.as_ref(),
                    &root,
                    path,
                    &bindings,
                    &mut cache,
                    &runtime_tx,
                )
                .await;
                if !keep_going {
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}
