// src/lib.rs

pub mod actions;
pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod reload;
pub mod transform;
pub mod watch;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::actions::{ActionContext, task_names};
use crate::cli::CliArgs;
use crate::config::{PathSet, load_or_default};
use crate::dag::{Scheduler, TaskRegistry};
use crate::engine::{CoreRuntime, RunReport, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::exec::ActionExecutor;
use crate::fs::{FileSystem, RealFileSystem};
use crate::reload::{DevServer, ReloadChannel};
use crate::watch::{WatchBinding, spawn_watcher, standard_bindings};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and path resolution
/// - task registry / scheduler / runtime
/// - action executor and reload channel
/// - (for `watch`) dev server and file watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<RunReport> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_or_default(&config_path)?;
    let root = config_root_dir(&config_path);
    let paths = PathSet::resolve_with(args.mode(), &cfg);

    let registry = TaskRegistry::standard()?;
    let watching = args.is_watch();
    let target = if watching {
        task_names::BUILD.to_string()
    } else {
        args.task.clone()
    };
    // Fails early with TaskNotFound for unknown task names.
    let plan: Vec<String> = registry
        .resolve(&target)?
        .into_iter()
        .map(|t| t.name.clone())
        .collect();

    if args.dry_run {
        let bindings = if watching {
            standard_bindings(&paths)?
        } else {
            Vec::new()
        };
        print_dry_run(&paths, &registry, &target, &plan, &bindings);
        return Ok(RunReport::default());
    }

    info!(mode = %paths.mode, task = %args.task, root = %root.display(), "starting");

    let registry = Arc::new(registry);
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let reload = ReloadChannel::new();

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let ctx = ActionContext::new(root.clone(), paths.clone(), Arc::clone(&fs));
    let executor = ActionExecutor::new(Arc::clone(&registry), ctx, reload.clone(), rt_tx.clone());

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let core = CoreRuntime::new(
        Scheduler::from_registry(&registry),
        RuntimeOptions {
            exit_when_idle: true,
        },
    );
    let mut runtime = Runtime::new(core, rt_rx, executor);

    info!(?plan, "running '{target}'");
    rt_tx
        .send(RuntimeEvent::TaskTriggered {
            task: target.clone(),
            reason: TriggerReason::Manual,
        })
        .await?;

    let mut report = runtime.run().await?;
    log_report(&target, &report);

    if !watching || report.interrupted {
        return Ok(report);
    }

    // Watch phase: serve the destination root and re-run pipelines on change.
    let addr = SocketAddr::from(([0, 0, 0, 0], paths.port));
    let _server = DevServer::start(addr, root.join(&paths.destination), reload).await?;
    let _watcher = spawn_watcher(fs, root, standard_bindings(&paths)?, rt_tx.clone())?;
    info!(port = paths.port, "watching for changes; press Ctrl+C to stop");

    runtime.core_mut().set_exit_when_idle(false);
    let watch_report = runtime.run().await?;

    report.succeeded.extend(watch_report.succeeded);
    report.failed.extend(watch_report.failed);
    report.interrupted = watch_report.interrupted;
    Ok(report)
}

/// Figure out the project root.
///
/// - If the config path has a non-empty parent (e.g. "site/Sitebuild.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Sitebuild.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn log_report(target: &str, report: &RunReport) {
    if report.is_success() {
        info!(task = %target, succeeded = report.succeeded.len(), "run finished");
    } else {
        error!(task = %target, failed = ?report.failed, "run finished with failures");
    }
}

/// Dry-run output: paths, task order and watch bindings.
fn print_dry_run(
    paths: &PathSet,
    registry: &TaskRegistry,
    target: &str,
    plan: &[String],
    bindings: &[WatchBinding],
) {
    println!("sitebuild dry-run");
    println!("  mode = {}", paths.mode);
    println!("  destination = {}", paths.destination.display());
    println!("  port = {}", paths.port);
    println!("  source_maps = {}", paths.source_maps);
    println!("  compress_images = {}", paths.compress_images);
    println!();

    println!("tasks for '{target}' ({}):", plan.len());
    for name in plan {
        let Some(task) = registry.get(name) else {
            continue;
        };
        let kind = if task.action.is_some() { "" } else { " (composite)" };
        if task.prerequisites.is_empty() {
            println!("  - {name}{kind}");
        } else {
            println!("  - {name}{kind} after {:?}", task.prerequisites);
        }
    }

    if !bindings.is_empty() {
        println!();
        println!("watch bindings:");
        for binding in bindings {
            println!("  {} -> {:?}", binding.glob(), binding.tasks());
        }
    }

    debug!("dry-run complete (no execution)");
}
