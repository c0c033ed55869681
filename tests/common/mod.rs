#![allow(dead_code)]

use std::sync::Arc;

use sitebuild::actions::ActionContext;
use sitebuild::cli::CliArgs;
use sitebuild::config::{BuildMode, PathSet};
use sitebuild::fs::RealFileSystem;
use sitebuild_test_utils::builders::SiteFixture;

pub use sitebuild_test_utils::{init_tracing, with_timeout};

pub const DEV_ROOT: &str = "build/development";
pub const PUB_ROOT: &str = "build/publish";

/// CLI arguments for a one-shot run of `task` inside `site`.
pub fn args_for(site: &SiteFixture, task: &str, publish: bool) -> CliArgs {
    CliArgs {
        task: task.to_string(),
        publish,
        config: site.path("Sitebuild.toml").to_string_lossy().into_owned(),
        log_level: None,
        dry_run: false,
    }
}

/// Action context over the real filesystem rooted at `site`.
pub fn context_for(site: &SiteFixture, mode: BuildMode) -> ActionContext {
    ActionContext::new(site.root(), PathSet::resolve(mode), Arc::new(RealFileSystem))
}
