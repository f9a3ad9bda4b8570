// src/snapshot/mod.rs

//! Per-directory snapshot and diff engine.
//!
//! A [`DirSnapshot`] records the last-known listing of one directory. Each
//! call to [`DirSnapshot::scan`] re-reads the directory, replaces the
//! recorded listing and returns a [`SnapshotDiff`] categorising what changed
//! since the previous call: created/modified/deleted entries and rename
//! pairs, each split into files vs. directories.
//!
//! This module knows nothing about watch trees or events; it only turns two
//! listings into a categorized comparison.

pub mod diff;
pub mod entry;
pub mod hash;
mod scan;

pub use diff::SnapshotDiff;
pub use entry::EntryInfo;
pub use scan::DirSnapshot;

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::{PollwatchError, Result};

/// Compiled per-watch scan settings, shared by every node of one watch tree.
#[derive(Debug)]
pub struct ScanOptions {
    root: PathBuf,
    excludes: Option<GlobSet>,
    content_hash: bool,
}

impl ScanOptions {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            excludes: None,
            content_hash: false,
        }
    }

    /// Compile exclude globs. Patterns are matched against paths relative to
    /// the watch root, with forward slashes (e.g. `"target/**"`).
    pub fn with_excludes(mut self, patterns: &[String]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(self);
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|source| PollwatchError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        self.excludes = Some(builder.build().map_err(|source| PollwatchError::Pattern {
            pattern: patterns.join(", "),
            source,
        })?);
        Ok(self)
    }

    pub fn with_content_hash(mut self, enabled: bool) -> Self {
        self.content_hash = enabled;
        self
    }

    pub(crate) fn content_hash(&self) -> bool {
        self.content_hash
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the entry `name` inside `dir` is excluded from scanning.
    pub(crate) fn is_excluded(&self, dir: &Path, name: &str) -> bool {
        let Some(excludes) = &self.excludes else {
            return false;
        };
        // Nodes redirected through an out-of-root link have no root-relative
        // form; fall back to matching the bare name.
        let rel = match dir.strip_prefix(&self.root) {
            Ok(rel) => rel.join(name),
            Err(_) => PathBuf::from(name),
        };
        let rel = rel.to_string_lossy().replace('\\', "/");
        excludes.is_match(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclude_matches_relative_to_root() {
        let opts = ScanOptions::new(PathBuf::from("/w"))
            .with_excludes(&["target/**".to_string(), "*.tmp".to_string()])
            .unwrap();

        assert!(opts.is_excluded(Path::new("/w/target"), "debug"));
        assert!(opts.is_excluded(Path::new("/w"), "junk.tmp"));
        assert!(!opts.is_excluded(Path::new("/w"), "src"));
        assert!(!opts.is_excluded(Path::new("/w/src"), "main.rs"));
    }

    #[test]
    fn invalid_pattern_is_a_config_error() {
        let err = ScanOptions::new(PathBuf::from("/w"))
            .with_excludes(&["a{b".to_string()])
            .unwrap_err();
        assert!(matches!(err, PollwatchError::Pattern { .. }));
    }
}
