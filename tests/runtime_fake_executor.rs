// tests/runtime_fake_executor.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::time::{Duration, timeout};

use sitebuild::dag::{Scheduler, TaskRegistry};
use sitebuild::engine::{
    CoreRuntime, RunReport, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason,
};
use sitebuild_test_utils::builders::RegistryBuilder;
use sitebuild_test_utils::fake_executor::FakeExecutor;

type TestResult = Result<(), Box<dyn Error>>;

fn position(executed: &[String], task: &str) -> usize {
    executed
        .iter()
        .position(|t| t == task)
        .unwrap_or_else(|| panic!("{task} was not executed: {executed:?}"))
}

/// Run `trigger` against `registry` with a fake executor and return what ran.
async fn run_with_fake(
    registry: &TaskRegistry,
    trigger: &str,
    failing: &[&str],
) -> Result<(Vec<String>, RunReport), Box<dyn Error>> {
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);

    let executed = Arc::new(Mutex::new(Vec::new()));
    let mut executor = FakeExecutor::new(rt_tx.clone(), executed.clone());
    for task in failing {
        executor = executor.failing(task);
    }

    // Seed initial manual trigger before starting the runtime loop.
    rt_tx
        .send(RuntimeEvent::TaskTriggered {
            task: trigger.to_string(),
            reason: TriggerReason::Manual,
        })
        .await?;

    let core = CoreRuntime::new(
        Scheduler::from_registry(registry),
        RuntimeOptions {
            exit_when_idle: true,
        },
    );
    let mut runtime = Runtime::new(core, rt_rx, executor);

    // Enforce an upper bound on how long this test may run.
    let report = match timeout(Duration::from_secs(3), runtime.run()).await {
        Ok(result) => result?,
        Err(_) => panic!("runtime did not finish within 3 seconds"),
    };

    let tasks_run = executed.lock().unwrap().clone();
    Ok((tasks_run, report))
}

#[tokio::test]
async fn build_runs_clean_first_and_every_task_once() -> TestResult {
    init_tracing();

    let registry = TaskRegistry::standard()?;
    let (executed, report) = run_with_fake(&registry, "build", &[]).await?;

    assert_eq!(executed.len(), 8, "{executed:?}");
    assert_eq!(executed[0], "clean");
    assert_eq!(executed.last().map(String::as_str), Some("build"));
    assert!(position(&executed, "styles") < position(&executed, "rtl-styles"));
    for task in &executed {
        assert_eq!(executed.iter().filter(|t| *t == task).count(), 1, "{task} ran twice");
    }

    assert!(report.is_success());
    assert!(!report.interrupted);
    assert_eq!(report.succeeded.len(), 8);
    Ok(())
}

#[tokio::test]
async fn single_task_pulls_in_only_its_prerequisites() -> TestResult {
    init_tracing();

    let registry = TaskRegistry::standard()?;
    let (executed, report) = run_with_fake(&registry, "rtl-styles", &[]).await?;

    assert_eq!(executed, vec!["clean", "styles", "rtl-styles"]);
    assert!(report.is_success());
    Ok(())
}

#[tokio::test]
async fn failed_clean_blocks_every_dependent() -> TestResult {
    init_tracing();

    let registry = TaskRegistry::standard()?;
    let (executed, report) = run_with_fake(&registry, "build", &["clean"]).await?;

    assert_eq!(executed, vec!["clean"]);
    assert!(!report.is_success());
    assert_eq!(report.failed.len(), 8, "{:?}", report.failed);
    assert!(report.succeeded.is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_asset_task_does_not_stop_its_siblings() -> TestResult {
    init_tracing();

    let registry = TaskRegistry::standard()?;
    let (executed, report) = run_with_fake(&registry, "build", &["styles"]).await?;

    for sibling in ["html", "scripts", "images", "vendor-plugins"] {
        assert!(executed.contains(&sibling.to_string()), "{sibling} missing");
        assert!(report.succeeded.contains(&sibling.to_string()));
    }
    // rtl-styles depends on styles; build depends on everything.
    assert!(!executed.contains(&"rtl-styles".to_string()));
    assert!(report.failed.contains(&"styles".to_string()));
    assert!(report.failed.contains(&"rtl-styles".to_string()));
    assert!(report.failed.contains(&"build".to_string()));
    Ok(())
}

#[tokio::test]
async fn watch_trigger_reruns_only_the_bound_task() -> TestResult {
    init_tracing();

    let registry = RegistryBuilder::new()
        .task("clean", &[])
        .task("styles", &["clean"])
        .task("scripts", &["clean"])
        .composite("build", &["styles", "scripts"])
        .build()?;

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(rt_tx.clone(), executed.clone());

    let core = CoreRuntime::new(
        Scheduler::from_registry(&registry),
        RuntimeOptions {
            exit_when_idle: true,
        },
    );
    let mut runtime = Runtime::new(core, rt_rx, executor);

    rt_tx
        .send(RuntimeEvent::TaskTriggered {
            task: "build".into(),
            reason: TriggerReason::Manual,
        })
        .await?;
    let first = timeout(Duration::from_secs(3), runtime.run()).await??;
    assert!(first.is_success());
    executed.lock().unwrap().clear();

    // Second phase: a file-watch trigger for `styles` after the initial build.
    rt_tx
        .send(RuntimeEvent::TaskTriggered {
            task: "styles".into(),
            reason: TriggerReason::FileWatch,
        })
        .await?;
    let second = timeout(Duration::from_secs(3), runtime.run()).await??;

    assert_eq!(*executed.lock().unwrap(), vec!["styles"]);
    assert_eq!(second.succeeded, vec!["styles"]);
    Ok(())
}

#[tokio::test]
async fn shutdown_request_interrupts_a_watching_runtime() -> TestResult {
    init_tracing();

    let registry = TaskRegistry::standard()?;
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(rt_tx.clone(), executed.clone());

    let core = CoreRuntime::new(
        Scheduler::from_registry(&registry),
        RuntimeOptions {
            exit_when_idle: false,
        },
    );
    let mut runtime = Runtime::new(core, rt_rx, executor);

    rt_tx.send(RuntimeEvent::ShutdownRequested).await?;
    let report = timeout(Duration::from_secs(3), runtime.run()).await??;

    assert!(report.interrupted);
    assert!(executed.lock().unwrap().is_empty());
    Ok(())
}
