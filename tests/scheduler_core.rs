// tests/scheduler_core.rs

//! The pure scheduler and core runtime, driven step by step.

use sitebuild::dag::{ScheduledTask, Scheduler, TaskRegistry, TaskRunState};
use sitebuild::engine::{
    CoreCommand, CoreRuntime, CoreStep, RunReport, RuntimeEvent, RuntimeOptions, TaskOutcome,
    TriggerReason,
};
use sitebuild_test_utils::builders::RegistryBuilder;

fn standard() -> Scheduler {
    Scheduler::from_registry(&TaskRegistry::standard().unwrap())
}

fn names(tasks: &[ScheduledTask]) -> Vec<&str> {
    tasks.iter().map(|t| t.name.as_str()).collect()
}

fn dispatched(step: &CoreStep) -> Vec<String> {
    step.commands
        .iter()
        .flat_map(|c| match c {
            CoreCommand::DispatchTasks(tasks) => tasks.iter().map(|t| t.name.clone()).collect(),
            CoreCommand::RequestExit => Vec::new(),
        })
        .collect()
}

fn trigger(task: &str, reason: TriggerReason) -> RuntimeEvent {
    RuntimeEvent::TaskTriggered {
        task: task.to_string(),
        reason,
    }
}

fn done(task: &str) -> RuntimeEvent {
    RuntimeEvent::TaskCompleted {
        task: task.to_string(),
        outcome: TaskOutcome::Success,
    }
}

#[test]
fn build_dispatches_clean_alone_then_the_assets_together() {
    let mut scheduler = standard();

    let first = scheduler.step_build("build");
    assert_eq!(names(&first.newly_scheduled), vec!["clean"]);
    assert_eq!(scheduler.run_state_of("html"), Some(TaskRunState::Pending));
    assert_eq!(scheduler.deps_satisfied("html"), Some(false));

    let second = scheduler.step_completion("clean", TaskOutcome::Success);
    assert_eq!(
        names(&second.newly_scheduled),
        vec!["html", "images", "scripts", "styles", "vendor-plugins"]
    );
    assert_eq!(scheduler.deps_satisfied("rtl-styles"), Some(false));

    let third = scheduler.step_completion("styles", TaskOutcome::Success);
    assert_eq!(names(&third.newly_scheduled), vec!["rtl-styles"]);
    assert!(!third.run_just_finished);
    assert_eq!(scheduler.deps_satisfied("unknown"), None);
}

#[test]
fn watch_trigger_without_prior_build_is_failed_not_stuck() {
    let mut scheduler = standard();

    // `styles` needs `clean`, which has never run and is not in this run.
    let step = scheduler.step_trigger("styles");

    assert!(step.newly_scheduled.is_empty());
    assert_eq!(step.newly_failed, vec!["styles"]);
    assert!(step.run_just_finished);
    assert!(scheduler.is_idle());
}

#[test]
fn watch_trigger_after_a_build_runs_only_that_task() {
    let mut scheduler = standard();
    let mut ready = scheduler.handle_build("build");
    while let Some(task) = ready.pop() {
        ready.extend(scheduler.handle_completion(&task.name, TaskOutcome::Success));
    }
    assert!(scheduler.is_idle());

    let step = scheduler.step_trigger("scripts");
    assert_eq!(names(&step.newly_scheduled), vec!["scripts"]);
    assert_eq!(scheduler.tasks_in_current_run(), vec!["scripts"]);
    assert_eq!(scheduler.run_state_of("html"), Some(TaskRunState::NotInRun));
}

#[test]
fn triggers_for_running_tasks_queue_and_coalesce() {
    let registry = RegistryBuilder::new()
        .task("clean", &[])
        .task("styles", &["clean"])
        .task("scripts", &["clean"])
        .build()
        .unwrap();
    let mut core = CoreRuntime::new(
        Scheduler::from_registry(&registry),
        RuntimeOptions {
            exit_when_idle: false,
        },
    );

    // Initial single-task runs so `clean` has succeeded once.
    let step = core.step(trigger("clean", TriggerReason::Manual));
    assert_eq!(dispatched(&step), vec!["clean"]);
    core.step(done("clean"));
    assert!(core.is_idle());

    let step = core.step(trigger("styles", TriggerReason::FileWatch));
    assert_eq!(dispatched(&step), vec!["styles"]);

    // Three more saves while `styles` is running: queued once.
    for _ in 0..3 {
        let step = core.step(trigger("styles", TriggerReason::FileWatch));
        assert!(dispatched(&step).is_empty());
    }
    assert!(!core.queue_is_empty());

    // A different task merges into the active run right away.
    let step = core.step(trigger("scripts", TriggerReason::FileWatch));
    assert_eq!(dispatched(&step), vec!["scripts"]);

    core.step(done("scripts"));
    let step = core.step(done("styles"));
    assert_eq!(dispatched(&step), vec!["styles"]);
    assert!(core.queue_is_empty());

    // The follow-up run is still active, so nothing has been settled yet.
    let pending = core.take_report();
    assert_eq!(pending.succeeded, vec!["scripts", "styles"]);

    let step = core.step(done("styles"));
    assert!(dispatched(&step).is_empty());
    assert!(step.keep_running);
    assert!(core.is_idle());

    // Finished watch runs are logged and dropped, not accumulated.
    assert_eq!(core.take_report(), RunReport::default());
}

#[test]
fn watch_mode_report_does_not_grow_across_rebuilds() {
    let registry = RegistryBuilder::new()
        .task("clean", &[])
        .task("scripts", &["clean"])
        .build()
        .unwrap();
    let mut core = CoreRuntime::new(
        Scheduler::from_registry(&registry),
        RuntimeOptions {
            exit_when_idle: false,
        },
    );

    core.step(trigger("scripts", TriggerReason::Manual));
    core.step(done("clean"));
    core.step(done("scripts"));

    for _ in 0..1_000 {
        let step = core.step(trigger("scripts", TriggerReason::FileWatch));
        assert_eq!(dispatched(&step), vec!["scripts"]);
        assert!(core.step(done("scripts")).keep_running);
    }

    let report = core.take_report();
    assert!(report.succeeded.is_empty(), "{report:?}");
    assert!(report.failed.is_empty(), "{report:?}");
}

#[test]
fn failed_watch_run_is_settled_too() {
    let registry = RegistryBuilder::new()
        .task("clean", &[])
        .task("styles", &["clean"])
        .build()
        .unwrap();
    let mut core = CoreRuntime::new(
        Scheduler::from_registry(&registry),
        RuntimeOptions {
            exit_when_idle: false,
        },
    );

    // No prior build: the watch trigger fails immediately and the run ends.
    let step = core.step(trigger("styles", TriggerReason::FileWatch));
    assert!(dispatched(&step).is_empty());
    assert!(core.is_idle());
    assert_eq!(core.take_report(), RunReport::default());
}

#[test]
fn exit_when_idle_requests_exit_after_the_last_completion() {
    let registry = RegistryBuilder::new()
        .task("clean", &[])
        .task("html", &["clean"])
        .build()
        .unwrap();
    let mut core = CoreRuntime::new(
        Scheduler::from_registry(&registry),
        RuntimeOptions {
            exit_when_idle: true,
        },
    );

    assert!(core.step(trigger("html", TriggerReason::Manual)).keep_running);
    assert!(core.step(done("clean")).keep_running);
    let last = core.step(done("html"));

    assert!(!last.keep_running);
    assert!(last.commands.contains(&CoreCommand::RequestExit));
}

#[test]
fn shutdown_marks_the_report_interrupted() {
    let mut core = CoreRuntime::new(
        standard(),
        RuntimeOptions {
            exit_when_idle: false,
        },
    );
    let step = core.step(RuntimeEvent::ShutdownRequested);

    assert!(!step.keep_running);
    assert!(core.take_report().interrupted);
    assert!(!core.take_report().interrupted);
}
