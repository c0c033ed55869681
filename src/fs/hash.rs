// src/fs/hash.rs

//! Content digests (blake3, hex encoded).

use std::path::Path;

use anyhow::Result;
use blake3::Hasher;

use crate::fs::FileSystem;

/// Digest of an in-memory buffer.
pub fn digest_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Digest of a single file's contents.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let bytes = fs.read(path)?;
    Ok(digest_bytes(&bytes))
}

/// Combine several digests into one.
///
/// `hashes` must already be in a stable order (e.g. sorted by path).
pub fn compute_aggregate_hash<'a, I>(hashes: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = Hasher::new();
    for h in hashes {
        hasher.update(h.as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}
