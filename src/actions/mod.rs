// src/actions/mod.rs

//! Build actions: one per asset class.
//!
//! An action knows which sources it reads and where its outputs go; the
//! content changes themselves live in [`crate::transform`]. Actions are
//! synchronous and run on the blocking pool, with per-file work fanned out
//! over `rayon`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;

use crate::config::PathSet;
use crate::dag::TaskRegistry;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::fs::hash::{compute_aggregate_hash, digest_bytes};
use crate::watch::patterns::{MatchedFile, collect_matching_files, compile_glob, glob_base};

pub mod clean;
pub mod html;
pub mod images;
pub mod plugins;
pub mod rtl;
pub mod scripts;
pub mod styles;

pub use clean::CleanAction;
pub use html::HtmlAction;
pub use images::ImagesAction;
pub use plugins::VendorPluginsAction;
pub use rtl::RtlStylesAction;
pub use scripts::ScriptsAction;
pub use styles::StylesAction;

/// Names of the tasks in the standard graph.
pub mod task_names {
    pub const CLEAN: &str = "clean";
    pub const HTML: &str = "html";
    pub const STYLES: &str = "styles";
    pub const RTL_STYLES: &str = "rtl-styles";
    pub const SCRIPTS: &str = "scripts";
    pub const IMAGES: &str = "images";
    pub const VENDOR_PLUGINS: &str = "vendor-plugins";
    pub const BUILD: &str = "build";
    /// Not a registered task: `build`, then serve and watch.
    pub const WATCH: &str = "watch";

    /// The asset tasks `build` is composed of.
    pub const ASSETS: [&str; 6] = [HTML, STYLES, RTL_STYLES, SCRIPTS, IMAGES, VENDOR_PLUGINS];
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("filesystem error at {path:?}: {source:#}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid source pattern: {0}")]
    Pattern(String),
}

impl ActionError {
    pub fn filesystem(path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        ActionError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// An output file, identified by its path below the destination root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub digest: String,
}

/// Everything one action invocation wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrittenFileSet {
    files: Vec<WrittenFile>,
}

impl WrittenFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, file: WrittenFile) {
        self.files.push(file);
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WrittenFile> {
        self.files.iter()
    }

    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .files
            .iter()
            .map(|f| f.path.to_string_lossy().replace('\\', "/"))
            .collect();
        paths.sort();
        paths
    }

    /// Stable digest over paths and contents, independent of write order.
    pub fn identity(&self) -> String {
        let mut entries: Vec<String> = self
            .files
            .iter()
            .map(|f| format!("{}:{}", f.path.to_string_lossy(), f.digest))
            .collect();
        entries.sort();
        compute_aggregate_hash(entries.iter().map(String::as_str))
    }
}

impl Extend<WrittenFile> for WrittenFileSet {
    fn extend<T: IntoIterator<Item = WrittenFile>>(&mut self, iter: T) {
        self.files.extend(iter);
    }
}

impl FromIterator<WrittenFile> for WrittenFileSet {
    fn from_iter<T: IntoIterator<Item = WrittenFile>>(iter: T) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

/// Everything an action needs: where the project lives, the resolved paths
/// for this build mode, and the filesystem to go through.
#[derive(Clone)]
pub struct ActionContext {
    pub root: PathBuf,
    pub paths: PathSet,
    pub fs: Arc<dyn FileSystem>,
}

impl fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext")
            .field("root", &self.root)
            .field("mode", &self.paths.mode)
            .finish_non_exhaustive()
    }
}

impl ActionContext {
    pub fn new(root: impl Into<PathBuf>, paths: PathSet, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: root.into(),
            paths,
            fs,
        }
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    /// Absolute (root-joined) form of a project-relative path.
    pub fn resolve(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.root.join(rel)
    }

    /// Source files matching `pattern`, sorted.
    pub fn source_files(&self, pattern: &str) -> std::result::Result<Vec<MatchedFile>, ActionError> {
        compile_glob(pattern).map_err(|e| ActionError::Pattern(format!("{e:#}")))?;
        collect_matching_files(self.fs(), &self.root, pattern)
            .map_err(|e| ActionError::filesystem(self.resolve(glob_base(pattern)), e))
    }

    pub fn read(&self, path: &Path) -> std::result::Result<Vec<u8>, ActionError> {
        self.fs().read(path).map_err(|e| ActionError::filesystem(path, e))
    }

    /// Write `contents` to the project-relative `target` and describe the result.
    pub fn write(
        &self,
        target: &Path,
        contents: &[u8],
    ) -> std::result::Result<WrittenFile, ActionError> {
        let full = self.resolve(target);
        self.fs()
            .write(&full, contents)
            .map_err(|e| ActionError::filesystem(&full, e))?;

        let path = target
            .strip_prefix(&self.paths.destination)
            .unwrap_or(target)
            .to_path_buf();
        Ok(WrittenFile {
            path,
            digest: digest_bytes(contents),
        })
    }
}

/// A unit of build work bound to a task.
pub trait BuildAction: Send + Sync {
    fn run(&self, ctx: &ActionContext) -> std::result::Result<WrittenFileSet, ActionError>;
}

/// Run `per_file` over every source matching `pattern` in parallel.
///
/// `per_file` returns the files it wrote; an `Err` fails the whole action.
/// Recoverable per-file problems are logged by `per_file`, which then
/// returns an empty list.
pub(crate) fn for_each_source<F>(
    ctx: &ActionContext,
    pattern: &str,
    per_file: F,
) -> std::result::Result<WrittenFileSet, ActionError>
where
    F: Fn(&MatchedFile) -> std::result::Result<Vec<WrittenFile>, ActionError> + Send + Sync,
{
    let sources = ctx.source_files(pattern)?;
    let written: Vec<Vec<WrittenFile>> = sources
        .par_iter()
        .map(per_file)
        .collect::<std::result::Result<_, _>>()?;
    Ok(written.into_iter().flatten().collect())
}

/// Copy every source matching `pattern` verbatim into `dest_dir`.
pub(crate) fn copy_sources(
    ctx: &ActionContext,
    pattern: &str,
    dest_dir: &Path,
) -> std::result::Result<WrittenFileSet, ActionError> {
    for_each_source(ctx, pattern, |file| {
        let bytes = ctx.read(&file.path)?;
        Ok(vec![ctx.write(&dest_dir.join(&file.relative), &bytes)?])
    })
}

impl TaskRegistry {
    /// The standard asset graph.
    ///
    /// `clean` runs first; every asset task depends on it, `rtl-styles` also
    /// on `styles`, and the composite `build` on all six asset tasks.
    pub fn standard() -> Result<Self> {
        use task_names::*;

        let mut registry = TaskRegistry::new();
        registry.register(CLEAN, Vec::<&str>::new(), Some(Arc::new(CleanAction)))?;
        registry.register(HTML, [CLEAN], Some(Arc::new(HtmlAction)))?;
        registry.register(STYLES, [CLEAN], Some(Arc::new(StylesAction)))?;
        registry.register(RTL_STYLES, [CLEAN, STYLES], Some(Arc::new(RtlStylesAction)))?;
        registry.register(SCRIPTS, [CLEAN], Some(Arc::new(ScriptsAction)))?;
        registry.register(IMAGES, [CLEAN], Some(Arc::new(ImagesAction)))?;
        registry.register(VENDOR_PLUGINS, [CLEAN], Some(Arc::new(VendorPluginsAction)))?;
        registry.register(BUILD, ASSETS, None)?;
        registry.validate()?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildMode;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn identity_ignores_write_order() {
        let a = WrittenFile {
            path: PathBuf::from("a.css"),
            digest: "1".into(),
        };
        let b = WrittenFile {
            path: PathBuf::from("b.css"),
            digest: "2".into(),
        };
        let one: WrittenFileSet = [a.clone(), b.clone()].into_iter().collect();
        let two: WrittenFileSet = [b, a].into_iter().collect();
        assert_eq!(one.identity(), two.identity());
    }

    #[test]
    fn written_paths_are_relative_to_the_destination() {
        let fs = Arc::new(MockFileSystem::new());
        let ctx = ActionContext::new("site", PathSet::resolve(BuildMode::Development), fs.clone());

        let written = ctx
            .write(&ctx.paths.css_dir.join("listty.css"), b".a{}")
            .unwrap();

        assert_eq!(written.path, PathBuf::from("assets/css/listty.css"));
        assert!(fs.file_paths().contains(&PathBuf::from(
            "site/build/development/assets/css/listty.css"
        )));
    }

    #[test]
    fn standard_registry_has_the_expected_shape() {
        let registry = TaskRegistry::standard().unwrap();
        assert_eq!(registry.len(), 8);
        let build = registry.get(task_names::BUILD).unwrap();
        assert!(build.action.is_none());
        assert_eq!(build.prerequisites.len(), 6);
        let rtl = registry.get(task_names::RTL_STYLES).unwrap();
        assert_eq!(rtl.prerequisites, ["clean", "styles"]);
    }
}
