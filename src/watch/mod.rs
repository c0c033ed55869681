// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - The watch bindings (source glob -> tasks) and glob helpers shared with
//!   the build actions.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Dropping events whose file content did not actually change.
//!
//! It does **not** know about the DAG; it only turns filesystem changes into
//! task-level triggers.

pub mod cache;
pub mod event_handler;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use event_handler::{process_file_change, tasks_for_path};
pub use patterns::{WatchBinding, standard_bindings};
pub use watcher::{WatcherHandle, spawn_watcher};
