// tests/watch_events.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Duration, sleep, timeout};

use sitebuild::config::{BuildMode, PathSet};
use sitebuild::engine::{RuntimeEvent, TriggerReason};
use sitebuild::fs::RealFileSystem;
use sitebuild::fs::mock::MockFileSystem;
use sitebuild::watch::cache::FileCache;
use sitebuild::watch::{process_file_change, spawn_watcher, standard_bindings, tasks_for_path};
use sitebuild_test_utils::builders::SiteFixture;

fn drain(rx: &mut mpsc::Receiver<RuntimeEvent>) -> Vec<String> {
    let mut tasks = Vec::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            RuntimeEvent::TaskTriggered {
                task,
                reason: TriggerReason::FileWatch,
            } => tasks.push(task),
            other => panic!("unexpected event: {other:?}"),
        }
    }
    tasks
}

#[test]
fn each_source_class_maps_to_its_pipeline() {
    let bindings = standard_bindings(&PathSet::resolve(BuildMode::Development)).unwrap();

    assert_eq!(tasks_for_path(&bindings, "src/index.html"), vec!["html"]);
    assert_eq!(tasks_for_path(&bindings, "src/_inc/nav/menu.htm"), vec!["html"]);
    assert_eq!(
        tasks_for_path(&bindings, "src/assets/scss/pages/_home.scss"),
        vec!["styles", "rtl-styles"]
    );
    assert_eq!(tasks_for_path(&bindings, "src/assets/js/main.js"), vec!["scripts"]);
    assert_eq!(tasks_for_path(&bindings, "src/assets/img/a/b.png"), vec!["images"]);
    assert!(tasks_for_path(&bindings, "src/assets/img/notes.txt").is_empty());
    assert!(tasks_for_path(&bindings, "src/assets/plugins/x/x.js").is_empty());
    assert!(tasks_for_path(&bindings, "build/development/index.html").is_empty());
}

#[tokio::test]
async fn changed_stylesheet_triggers_styles_and_rtl() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("site/src/assets/scss/listty.scss", ".a { float: left; }");
    let bindings = standard_bindings(&PathSet::resolve(BuildMode::Development)).unwrap();
    let mut cache = FileCache::new();
    let (tx, mut rx) = mpsc::channel(16);

    let keep_going = process_file_change(
        &fs,
        Path::new("site"),
        Path::new("site/src/assets/scss/listty.scss"),
        &bindings,
        &mut cache,
        &tx,
    )
    .await;

    assert!(keep_going);
    assert_eq!(drain(&mut rx), vec!["styles", "rtl-styles"]);
}

#[tokio::test]
async fn repeated_event_with_same_content_is_ignored() {
    init_tracing();
    let fs = MockFileSystem::new();
    let page = Path::new("site/src/index.html");
    fs.add_file(page, "<p>one</p>");
    let bindings = standard_bindings(&PathSet::resolve(BuildMode::Development)).unwrap();
    let mut cache = FileCache::new();
    cache.prime(&fs, page).unwrap();
    let (tx, mut rx) = mpsc::channel(16);

    process_file_change(&fs, Path::new("site"), page, &bindings, &mut cache, &tx).await;
    assert!(drain(&mut rx).is_empty());

    fs.add_file(page, "<p>two</p>");
    process_file_change(&fs, Path::new("site"), page, &bindings, &mut cache, &tx).await;
    assert_eq!(drain(&mut rx), vec!["html"]);
}

#[tokio::test]
async fn unbound_and_deleted_files() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("site/README.md", "readme");
    let bindings = standard_bindings(&PathSet::resolve(BuildMode::Development)).unwrap();
    let mut cache = FileCache::new();
    let (tx, mut rx) = mpsc::channel(16);

    process_file_change(
        &fs,
        Path::new("site"),
        Path::new("site/README.md"),
        &bindings,
        &mut cache,
        &tx,
    )
    .await;
    assert!(drain(&mut rx).is_empty());

    // A removed script still re-runs its pipeline.
    process_file_change(
        &fs,
        Path::new("site"),
        Path::new("site/src/assets/js/gone.js"),
        &bindings,
        &mut cache,
        &tx,
    )
    .await;
    assert_eq!(drain(&mut rx), vec!["scripts"]);
}

#[tokio::test]
async fn closed_runtime_channel_stops_processing() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("site/src/assets/js/main.js", "var a;");
    let bindings = standard_bindings(&PathSet::resolve(BuildMode::Development)).unwrap();
    let mut cache = FileCache::new();
    let (tx, rx) = mpsc::channel(16);
    drop(rx);

    let keep_going = process_file_change(
        &fs,
        Path::new("site"),
        Path::new("site/src/assets/js/main.js"),
        &bindings,
        &mut cache,
        &tx,
    )
    .await;
    assert!(!keep_going);
}

#[tokio::test]
async fn watcher_reports_a_real_edit() {
    init_tracing();
    let site = SiteFixture::standard();
    let bindings = standard_bindings(&PathSet::resolve(BuildMode::Development)).unwrap();
    let (tx, mut rx) = mpsc::channel(64);

    let _watcher = spawn_watcher(Arc::new(RealFileSystem), site.root(), bindings, tx).unwrap();
    // Give the OS watcher a moment to register.
    sleep(Duration::from_millis(200)).await;

    site.write("src/assets/js/main.js", b"var edited = true;\n");

    let event = with_timeout(async {
        loop {
            match timeout(Duration::from_secs(4), rx.recv()).await {
                Ok(Some(RuntimeEvent::TaskTriggered { task, reason })) => break (task, reason),
                Ok(Some(_)) => continue,
                Ok(None) | Err(_) => panic!("no trigger received"),
            }
        }
    })
    .await;

    assert_eq!(event, ("scripts".to_string(), TriggerReason::FileWatch));
}
