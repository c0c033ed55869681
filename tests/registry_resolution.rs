// tests/registry_resolution.rs

use std::sync::Arc;

use sitebuild::actions::{CleanAction, task_names};
use sitebuild::dag::TaskRegistry;
use sitebuild::errors::SiteBuildError;
use sitebuild_test_utils::builders::RegistryBuilder;

fn names(registry: &TaskRegistry, task: &str) -> Vec<String> {
    registry
        .resolve(task)
        .unwrap()
        .into_iter()
        .map(|t| t.name.clone())
        .collect()
}

#[test]
fn build_resolves_clean_first_and_itself_last() {
    let registry = TaskRegistry::standard().unwrap();
    let order = names(&registry, task_names::BUILD);

    assert_eq!(
        order,
        vec![
            "clean",
            "html",
            "styles",
            "rtl-styles",
            "scripts",
            "images",
            "vendor-plugins",
            "build"
        ]
    );
}

#[test]
fn prerequisites_are_deduplicated_in_first_seen_order() {
    let registry = RegistryBuilder::new()
        .task("a", &[])
        .task("b", &["a"])
        .task("c", &["a", "b"])
        .composite("all", &["c", "b", "a"])
        .build()
        .unwrap();

    assert_eq!(names(&registry, "all"), vec!["a", "b", "c", "all"]);
    assert_eq!(names(&registry, "a"), vec!["a"]);
}

#[test]
fn unknown_task_name_is_task_not_found() {
    let registry = TaskRegistry::standard().unwrap();
    match registry.resolve("deploy") {
        Err(SiteBuildError::TaskNotFound(name)) => assert_eq!(name, "deploy"),
        other => panic!("Expected TaskNotFound, got: {other:?}"),
    }
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut registry = TaskRegistry::new();
    registry
        .register("clean", Vec::<&str>::new(), Some(Arc::new(CleanAction)))
        .unwrap();
    let err = registry
        .register("clean", Vec::<&str>::new(), None)
        .unwrap_err();
    assert!(matches!(err, SiteBuildError::DuplicateTask(_)), "{err:?}");
}

#[test]
fn unknown_dependency_is_a_config_error() {
    let result = RegistryBuilder::new().task("a", &["NonExistent"]).build();

    match result {
        Err(SiteBuildError::ConfigError(msg)) => {
            assert!(msg.contains("unknown dependency"));
            assert!(msg.contains("NonExistent"));
        }
        Err(e) => panic!("Expected ConfigError, got: {e:?}"),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn dependency_cycle_is_reported() {
    let result = RegistryBuilder::new()
        .task("a", &["b"])
        .task("b", &["a"])
        .build();

    match result {
        Err(SiteBuildError::DagCycle(msg)) => {
            assert!(msg.contains("cycle"));
            assert!(msg.contains('a') || msg.contains('b'));
        }
        Err(e) => panic!("Expected DagCycle error, got: {e:?}"),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn resolve_on_an_unvalidated_cycle_does_not_loop() {
    let mut registry = TaskRegistry::new();
    registry.register("a", ["b"], None).unwrap();
    registry.register("b", ["a"], None).unwrap();

    match registry.resolve("a") {
        Err(SiteBuildError::DagCycle(msg)) => assert_eq!(msg, "dependency cycle: a -> b -> a"),
        other => panic!("Expected DagCycle, got: {other:?}"),
    }
}
