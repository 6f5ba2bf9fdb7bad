//! Content hashes for change detection
//!
//! Editors often touch a file without changing it. A path only counts as
//! changed when its content hash differs from the last one seen.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Last seen content hash per file
#[derive(Debug, Default)]
pub struct ContentHashes {
    hashes: HashMap<PathBuf, String>,
}

impl ContentHashes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Record the current content of `path` without reporting a change.
    pub fn seed(&mut self, path: &Path) {
        if let Ok(content) = std::fs::read(path) {
            self.hashes
                .insert(path.to_path_buf(), compute_content_hash(&content));
        }
    }

    /// Whether `path` differs from the last observation, recording the new
    /// state. Unreadable (e.g. deleted) files always count as changed.
    pub fn observe(&mut self, path: &Path) -> bool {
        match std::fs::read(path) {
            Ok(content) => {
                let hash = compute_content_hash(&content);
                match self.hashes.get(path) {
                    Some(previous) if *previous == hash => false,
                    _ => {
                        self.hashes.insert(path.to_path_buf(), hash);
                        true
                    }
                }
            }
            Err(_) => {
                self.hashes.remove(path);
                true
            }
        }
    }
}

/// SHA-256 of content, `sha256:`-prefixed hex
pub fn compute_content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("sha256:{:x}", hasher.finalize())
}
