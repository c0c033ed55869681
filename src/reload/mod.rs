// src/reload/mod.rs

//! Browser live-reload.
//!
//! The executor pushes a [`ReloadEvent`] into the [`ReloadChannel`] after
//! every successful action; the [`DevServer`] streams those events to
//! connected pages over server-sent events.

pub mod channel;
pub mod server;

pub use channel::{ReloadChannel, ReloadEvent};
pub use server::DevServer;
