// src/tree/mod.rs

//! The recursive watch-tree reconciliation engine.
//!
//! One [`node::DirNode`] per watched directory, owned by its parent node.
//! Each poll pass re-scans a node, translates the diff into events, mutates
//! the tree so later polls stay correctly scoped, and then descends into the
//! children. The [`guard`] decides which candidate directories may become
//! nodes at all, keeping the tree finite and duplicate-free in the presence
//! of symlinks.

pub(crate) mod guard;
pub(crate) mod mutate;
pub(crate) mod node;
pub mod path_resolve;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::events::EventSink;
use crate::fs::FileSystem;
use crate::snapshot::ScanOptions;
use crate::types::{LinkPolicy, WatchId, WatchStats};

/// Query against the *other* watches of the forest, injected into a poll so
/// the guard can refuse directories already covered elsewhere.
pub(crate) trait SiblingQuery {
    fn path_in_watches(&self, path: &Path) -> bool;
}

/// Sibling view for a watch with no neighbours (single-watch operations,
/// teardown).
pub(crate) struct NoSiblings;

impl SiblingQuery for NoSiblings {
    fn path_in_watches(&self, _path: &Path) -> bool {
        false
    }
}

/// Everything a node needs during one poll pass, borrowed from the watch that
/// owns the tree. Nodes store none of this themselves; the context outlives
/// every node it is handed to only for the duration of the pass.
pub(crate) struct PollContext<'a> {
    pub id: WatchId,
    pub watch_root: &'a Path,
    pub recursive: bool,
    pub fs: &'a dyn FileSystem,
    pub sink: &'a dyn EventSink,
    pub policy: &'a LinkPolicy,
    pub siblings: &'a dyn SiblingQuery,
    pub scan: &'a ScanOptions,
    pub stats: &'a WatchStats,
}

/// Live index of every directory path watched by one tree.
///
/// Kept in lockstep with node construction and teardown so the guard can
/// answer "is this path already watched here?" while the tree is being
/// mutated mid-poll (the recursive per-node query cannot be used then, since
/// the tree above the mutation point is mutably borrowed).
#[derive(Debug, Default)]
pub(crate) struct TreePaths {
    paths: HashSet<PathBuf>,
}

impl TreePaths {
    pub fn insert(&mut self, path: PathBuf) {
        self.paths.insert(path);
    }

    pub fn remove(&mut self, path: &Path) {
        self.paths.remove(path);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}
