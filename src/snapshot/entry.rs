// src/snapshot/entry.rs

use crate::fs::FileMeta;

/// One recorded directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Bare entry name within its directory.
    pub name: String,
    pub meta: FileMeta,
    /// Content hash, present only in content-hash mode and only for files.
    pub content_hash: Option<String>,
}

impl EntryInfo {
    pub fn is_dir(&self) -> bool {
        self.meta.is_dir
    }
}
