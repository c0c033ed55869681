// src/watch/path_utils.rs

//! Path normalisation for watcher events.

use std::path::Path;

use crate::fs::FileSystem;

/// Convert `path` into a root-relative string with forward slashes, the form
/// watch globs are matched against.
///
/// notify may report paths under a different absolute prefix than the one we
/// watched (symlinked temp dirs on macOS, for instance), so if the direct
/// prefix strip fails both sides are canonicalized and tried again.
pub fn relative_str(fs: &dyn FileSystem, root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    let root_canon = fs.canonicalize(root).ok()?;
    let path_canon = fs
        .canonicalize(path)
        .ok()
        .or_else(|| canonicalize_parent(fs, path))?;
    path_canon.strip_prefix(&root_canon).ok().map(to_slash)
}

/// A deleted file can't be canonicalized; its parent directory usually can.
fn canonicalize_parent(fs: &dyn FileSystem, path: &Path) -> Option<std::path::PathBuf> {
    let parent = fs.canonicalize(path.parent()?).ok()?;
    Some(parent.join(path.file_name()?))
}

fn to_slash(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn strips_the_root_prefix() {
        let fs = MockFileSystem::new();
        assert_eq!(
            relative_str(&fs, Path::new("/site"), Path::new("/site/src/index.html")),
            Some("src/index.html".to_string())
        );
    }

    #[test]
    fn unrelated_paths_yield_none() {
        let fs = MockFileSystem::new();
        assert_eq!(
            relative_str(&fs, Path::new("/site"), Path::new("/elsewhere/a.html")),
            None
        );
    }
}
