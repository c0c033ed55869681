// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobBuilder, GlobMatcher};

use crate::actions::task_names;
use crate::config::PathSet;
use crate::engine::TaskName;
use crate::fs::FileSystem;

/// A source glob and the tasks to re-run when a matching file changes.
///
/// Globs are relative to the project root. The watcher passes root-relative
/// paths with forward slashes (e.g. `"src/assets/scss/main.scss"`) into
/// [`matches`](Self::matches).
#[derive(Clone)]
pub struct WatchBinding {
    glob: String,
    tasks: Vec<TaskName>,
    matcher: GlobMatcher,
}

impl fmt::Debug for WatchBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchBinding")
            .field("glob", &self.glob)
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

impl WatchBinding {
    pub fn new<I, S>(glob: impl Into<String>, tasks: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        let glob = glob.into();
        let matcher = compile_glob(&glob)?;
        Ok(Self {
            glob,
            tasks: tasks.into_iter().map(Into::into).collect(),
            matcher,
        })
    }

    pub fn glob(&self) -> &str {
        &self.glob
    }

    pub fn tasks(&self) -> &[TaskName] {
        &self.tasks
    }

    /// Directory the watcher has to observe for this binding.
    pub fn base(&self) -> PathBuf {
        glob_base(&self.glob)
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.matcher.is_match(rel_path)
    }
}

/// The watch bindings of the `watch` operation.
///
/// Styles are bound twice: once for the stylesheet build and once for the
/// RTL twin, so both re-run on every `.scss` save.
pub fn standard_bindings(paths: &PathSet) -> Result<Vec<WatchBinding>> {
    Ok(vec![
        WatchBinding::new(&paths.html, [task_names::HTML])?,
        WatchBinding::new(&paths.html_includes, [task_names::HTML])?,
        WatchBinding::new(&paths.styles, [task_names::STYLES, task_names::RTL_STYLES])?,
        WatchBinding::new(&paths.scripts, [task_names::SCRIPTS])?,
        WatchBinding::new(&paths.images, [task_names::IMAGES])?,
    ])
}

/// Compile a glob the way shell-style source globs behave: `*` stops at `/`,
/// `**` crosses directories.
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher> {
    let glob: Glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid glob pattern: {pattern}"))?;
    Ok(glob.compile_matcher())
}

/// Leading path of `pattern` that contains no glob metacharacters.
///
/// `src/assets/scss/**/*.scss` -> `src/assets/scss`, `src/*.html` -> `src`.
pub fn glob_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    for part in pattern.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part.contains(['*', '?', '[', '{']) {
            break;
        }
        base.push(part);
    }
    // A pattern without metacharacters names a single file; watch its dir.
    if !pattern.contains(['*', '?', '[', '{']) {
        base.pop();
    }
    base
}

/// A source file matched by a glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedFile {
    /// Path to read from (`root` joined with the root-relative path).
    pub path: PathBuf,
    /// Path relative to the glob's static base; this is where the file
    /// lands below the action's destination directory.
    pub relative: PathBuf,
}

/// Collect every file under `root` matching `pattern`, sorted by path.
pub fn collect_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    pattern: &str,
) -> Result<Vec<MatchedFile>> {
    let matcher = compile_glob(pattern)?;
    let base = glob_base(pattern);
    let base_dir = root.join(&base);

    let mut files = Vec::new();
    if !fs.is_dir(&base_dir) {
        return Ok(files);
    }

    let mut stack = vec![base_dir];
    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                let Ok(rel) = path.strip_prefix(root) else {
                    continue;
                };
                let rel_str = rel.to_string_lossy().replace('\\', "/");
                if !matcher.is_match(&rel_str) {
                    continue;
                }
                let relative = rel.strip_prefix(&base).unwrap_or(rel).to_path_buf();
                files.push(MatchedFile { path, relative });
            }
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}
