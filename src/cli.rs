// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::config::BuildMode;

/// Task name used when no task argument is given.
pub const DEFAULT_TASK: &str = "watch";

/// Command-line arguments for `sitebuild`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sitebuild",
    version,
    about = "Build static site assets and rebuild them on file changes.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run: `watch` (default) builds and then keeps watching;
    /// any other registered task (`build`, `html`, `styles`, ...) runs once
    /// together with its prerequisites.
    #[arg(value_name = "TASK", default_value = DEFAULT_TASK)]
    pub task: String,

    /// Build for publishing (`build/publish/`, no source maps, compressed images).
    #[arg(long = "pub")]
    pub publish: bool,

    /// Path to the optional site config file (TOML).
    ///
    /// Built-in defaults are used when the file does not exist.
    #[arg(long, value_name = "PATH", default_value = "Sitebuild.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SITEBUILD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve paths and the task plan, print them, but don't build anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Build mode selected by `--pub`.
    pub fn mode(&self) -> BuildMode {
        if self.publish {
            BuildMode::Publish
        } else {
            BuildMode::Development
        }
    }

    /// Whether the invocation asks for the long-running watch loop.
    pub fn is_watch(&self) -> bool {
        self.task == DEFAULT_TASK
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
