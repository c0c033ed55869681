#![allow(dead_code)]

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use sitebuild::actions::{ActionContext, ActionError, BuildAction, WrittenFileSet};
use sitebuild::dag::TaskRegistry;
use tempfile::TempDir;

/// Shared log of action invocations, in call order.
pub type ActionLog = Arc<Mutex<Vec<String>>>;

/// Action that records its task name and optionally fails.
#[derive(Debug)]
pub struct RecordingAction {
    name: String,
    log: ActionLog,
    fail: bool,
}

impl BuildAction for RecordingAction {
    fn run(&self, _ctx: &ActionContext) -> Result<WrittenFileSet, ActionError> {
        self.log.lock().unwrap().push(self.name.clone());
        if self.fail {
            return Err(ActionError::filesystem(
                &self.name,
                anyhow::anyhow!("{} was told to fail", self.name),
            ));
        }
        Ok(WrittenFileSet::new())
    }
}

/// Builder for a `TaskRegistry` whose actions only record that they ran.
pub struct RegistryBuilder {
    tasks: Vec<(String, Vec<String>, bool)>,
    failing: BTreeSet<String>,
    log: ActionLog,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            failing: BTreeSet::new(),
            log: ActionLog::default(),
        }
    }

    /// Register a task with a recording action.
    pub fn task(mut self, name: &str, after: &[&str]) -> Self {
        self.tasks
            .push((name.to_string(), after.iter().map(|s| s.to_string()).collect(), true));
        self
    }

    /// Register a composite task (no action).
    pub fn composite(mut self, name: &str, after: &[&str]) -> Self {
        self.tasks
            .push((name.to_string(), after.iter().map(|s| s.to_string()).collect(), false));
        self
    }

    /// Make the action of `name` return an error.
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn log(&self) -> ActionLog {
        Arc::clone(&self.log)
    }

    /// Build and validate the registry.
    pub fn build(self) -> sitebuild::errors::Result<TaskRegistry> {
        let mut registry = TaskRegistry::new();
        for (name, after, has_action) in self.tasks {
            let action: Option<Arc<dyn BuildAction>> = if has_action {
                Some(Arc::new(RecordingAction {
                    fail: self.failing.contains(&name),
                    name: name.clone(),
                    log: Arc::clone(&self.log),
                }))
            } else {
                None
            };
            registry.register(name, after, action)?;
        }
        registry.validate()?;
        Ok(registry)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A throwaway project directory on the real filesystem.
pub struct SiteFixture {
    dir: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    /// Project with one page, one include, one stylesheet (named like the
    /// default RTL source), one script, one image and one vendor plugin.
    pub fn standard() -> Self {
        Self::new()
            .file(
                "src/index.html",
                "<html><body>@@include('header.htm', {\"title\": \"Home\"})</body></html>\n",
            )
            .file("src/_inc/header.htm", "<h1>@@title</h1>")
            .file(
                "src/assets/scss/listty.scss",
                "@import 'variables';\n.nav { float: left; margin: 0 4px 0 8px; color: $brand; }\n",
            )
            .file("src/assets/scss/_variables.scss", "$brand: #336699;\n")
            .file("src/assets/js/main.js", "var a = 1;\nif (a === 1) { run(); }\n")
            .file("src/assets/img/logo.gif", "GIF89a-not-really")
            .file("src/assets/plugins/slider/slider.js", "/* slider */\n")
    }

    /// Write a file below the project root, creating parent directories.
    pub fn file(self, rel: &str, contents: &str) -> Self {
        self.write(rel, contents.as_bytes());
        self
    }

    pub fn write(&self, rel: &str, contents: &[u8]) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(&path, contents).expect("failed to write fixture file");
    }

    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.path(rel)).expect("failed to remove fixture file");
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel))
            .unwrap_or_else(|e| panic!("failed to read {rel}: {e}"))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    /// All files below `rel`, relative to it, sorted, with forward slashes.
    pub fn list(&self, rel: &str) -> Vec<String> {
        let base = self.path(rel);
        let mut out = Vec::new();
        let mut stack = vec![base.clone()];
        while let Some(dir) = stack.pop() {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else if let Ok(r) = path.strip_prefix(&base) {
                    out.push(r.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        out.sort();
        out
    }
}

impl Default for SiteFixture {
    fn default() -> Self {
        Self::new()
    }
}
