// src/config/mod.rs

//! Configuration loading and path resolution for sitebuild.
//!
//! Responsibilities:
//! - Define the TOML-backed site config (`model.rs`).
//! - Load it from disk, falling back to defaults (`loader.rs`).
//! - Validate globs, ports and file names (`validate.rs`).
//! - Resolve the per-mode [`PathSet`] (`paths.rs`).

pub mod loader;
pub mod model;
pub mod paths;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{
    OutputSection, PathsSection, RawSiteConfig, ServerSection, SiteConfig, StylesSection,
};
pub use paths::{BuildMode, PathSet};
