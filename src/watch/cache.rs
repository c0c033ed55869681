// src/watch/cache.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::fs::FileSystem;
use crate::fs::hash::compute_file_hash;

/// Last seen content digest per watched file.
///
/// Editors often emit several events for one save (truncate, write, chmod),
/// and some rewrite files without changing them. Only a real content change
/// should re-run a pipeline.
#[derive(Debug, Default)]
pub struct FileCache {
    hashes: HashMap<PathBuf, String>,
}

impl FileCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Record the current digest of `path` without reporting a change.
    pub fn prime(&mut self, fs: &dyn FileSystem, path: &Path) -> Result<()> {
        let hash = compute_file_hash(fs, path)?;
        self.hashes.insert(path.to_path_buf(), hash);
        Ok(())
    }

    /// Re-hash `path` and report whether its content differs from the last
    /// digest seen. A file seen for the first time counts as changed.
    pub fn changed(&mut self, fs: &dyn FileSystem, path: &Path) -> Result<bool> {
        let hash = compute_file_hash(fs, path)?;
        match self.hashes.insert(path.to_path_buf(), hash.clone()) {
            Some(old) if old == hash => {
                debug!(path = %path.display(), "content unchanged");
                Ok(false)
            }
            _ => Ok(true),
        }
    }

    /// Forget a removed file.
    pub fn forget(&mut self, path: &Path) {
        if self.hashes.remove(path).is_some() {
            debug!(path = %path.display(), "dropped cached digest");
        }
    }
}
