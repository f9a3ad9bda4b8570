// src/forest.rs

//! The watch forest: every registered watch tree in one engine instance.
//!
//! The forest owns the trees, allocates watch ids, and drives the poll pass.
//! It is deliberately single-threaded: one `poll()` completes fully (diff,
//! translate, mutate, recurse, for every watch) before the next may begin.
//! Independent forests share no state and may be polled in parallel.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::{PollwatchError, Result};
use crate::events::EventSink;
use crate::fs::{FileSystem, RealFileSystem};
use crate::snapshot::ScanOptions;
use crate::tree::node::DirNode;
use crate::tree::path_resolve::strip_trailing_separator;
use crate::tree::{NoSiblings, PollContext, SiblingQuery, TreePaths};
use crate::types::{StatsSnapshot, WatchId, WatchOptions, WatchStats};

/// One registered watch: the shared context of its tree plus the tree itself.
struct Watch {
    id: WatchId,
    root_path: PathBuf,
    options: WatchOptions,
    scan: ScanOptions,
    sink: Box<dyn EventSink>,
    stats: WatchStats,
    tree: TreePaths,
    root: DirNode,
}

impl Watch {
    fn poll(&mut self, fs: &dyn FileSystem, siblings: &dyn SiblingQuery) {
        let ctx = PollContext {
            id: self.id,
            watch_root: &self.root_path,
            recursive: self.options.recursive,
            fs,
            sink: self.sink.as_ref(),
            policy: &self.options.link_policy,
            siblings,
            scan: &self.scan,
            stats: &self.stats,
        };
        self.root.poll(&ctx, &mut self.tree);
    }
}

/// View over every watch except the one currently being polled or built.
struct SiblingWatches<'a> {
    left: &'a [Watch],
    right: &'a [Watch],
}

impl SiblingQuery for SiblingWatches<'_> {
    fn path_in_watches(&self, path: &Path) -> bool {
        self.left
            .iter()
            .chain(self.right.iter())
            .any(|w| w.root.path_in_watches(path))
    }
}

/// The polling fallback engine: a set of watch trees over one filesystem.
///
/// No timing lives here; an external driver calls [`WatchForest::poll`] at
/// whatever cadence it wants.
#[derive(Debug)]
pub struct WatchForest {
    fs: Arc<dyn FileSystem>,
    watches: Vec<Watch>,
    next_id: u64,
}

impl std::fmt::Debug for Watch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watch")
            .field("id", &self.id)
            .field("root_path", &self.root_path)
            .finish_non_exhaustive()
    }
}

impl Default for WatchForest {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchForest {
    pub fn new() -> Self {
        Self::with_filesystem(Arc::new(RealFileSystem))
    }

    /// Build a forest over a custom filesystem, e.g. a mock in tests.
    pub fn with_filesystem(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            watches: Vec::new(),
            next_id: 1,
        }
    }

    /// Register a watch rooted at `path` and take its initial snapshot.
    ///
    /// Registration is silent: existing content becomes the baseline, and
    /// only changes observed by later [`poll`](Self::poll) calls produce
    /// events. The root must be an absolute path to an existing directory
    /// not already covered by another watch; a symlinked root is resolved
    /// and the target is watched.
    pub fn add_watch(
        &mut self,
        path: impl AsRef<Path>,
        sink: Box<dyn EventSink>,
        options: WatchOptions,
    ) -> Result<WatchId> {
        let requested = PathBuf::from(strip_trailing_separator(
            &path.as_ref().to_string_lossy(),
        ));
        if !requested.is_absolute() {
            return Err(PollwatchError::NonAbsoluteRoot(requested));
        }
        if !self.fs.is_dir(&requested) {
            return Err(PollwatchError::NotADirectory(requested));
        }
        let root_path = self
            .fs
            .canonicalize(&requested)
            .unwrap_or_else(|_| requested.clone());
        if self.path_in_watches(&root_path) {
            return Err(PollwatchError::AlreadyWatched(root_path));
        }

        let scan = ScanOptions::new(root_path.clone())
            .with_excludes(&options.exclude)?
            .with_content_hash(options.content_hash);

        let id = WatchId(self.next_id);
        self.next_id += 1;

        let stats = WatchStats::default();
        let mut tree = TreePaths::default();
        let siblings = SiblingWatches {
            left: &self.watches,
            right: &[],
        };
        let ctx = PollContext {
            id,
            watch_root: &root_path,
            recursive: options.recursive,
            fs: self.fs.as_ref(),
            sink: sink.as_ref(),
            policy: &options.link_policy,
            siblings: &siblings,
            scan: &scan,
            stats: &stats,
        };
        let mut root = DirNode::open(root_path.clone(), &ctx, &mut tree);
        root.populate(&ctx, &mut tree);

        info!(watch = %id, path = ?root_path, nodes = tree.len(), "watch registered");

        self.watches.push(Watch {
            id,
            root_path,
            options,
            scan,
            sink,
            stats,
            tree,
            root,
        });
        Ok(id)
    }

    /// Cancel a watch, releasing its tree without emitting events.
    pub fn remove_watch(&mut self, id: WatchId) -> Result<()> {
        let idx = self
            .watches
            .iter()
            .position(|w| w.id == id)
            .ok_or(PollwatchError::UnknownWatch(id))?;
        let mut watch = self.watches.remove(idx);

        let ctx = PollContext {
            id: watch.id,
            watch_root: &watch.root_path,
            recursive: watch.options.recursive,
            fs: self.fs.as_ref(),
            sink: watch.sink.as_ref(),
            policy: &watch.options.link_policy,
            siblings: &NoSiblings,
            scan: &watch.scan,
            stats: &watch.stats,
        };
        watch.root.teardown(&ctx, &mut watch.tree);

        debug!(watch = %id, "watch removed");
        Ok(())
    }

    /// Run one full poll pass over every watch, in registration order.
    pub fn poll(&mut self) {
        for i in 0..self.watches.len() {
            let (left, rest) = self.watches.split_at_mut(i);
            let Some((watch, right)) = rest.split_first_mut() else {
                break;
            };
            let siblings = SiblingWatches { left, right };
            watch.poll(self.fs.as_ref(), &siblings);
        }
    }

    /// Whether `path` is covered by any watch of this forest.
    pub fn path_in_watches(&self, path: &Path) -> bool {
        self.watches.iter().any(|w| w.root.path_in_watches(path))
    }

    /// The id of the watch rooted exactly at `path`, if any.
    pub fn watch_id_of(&self, path: &Path) -> Option<WatchId> {
        self.watches
            .iter()
            .find(|w| w.root_path == path)
            .map(|w| w.id)
    }

    /// Every directory path currently watched under the given watch, root
    /// first, then depth-first. Mainly an observability/testing surface.
    pub fn watched_paths(&self, id: WatchId) -> Option<Vec<PathBuf>> {
        let watch = self.watches.iter().find(|w| w.id == id)?;
        let mut out = Vec::new();
        watch.root.node_paths(&mut out);
        Some(out)
    }

    /// Counters of the given watch.
    pub fn stats(&self, id: WatchId) -> Option<StatsSnapshot> {
        self.watches
            .iter()
            .find(|w| w.id == id)
            .map(|w| w.stats.snapshot())
    }

    pub fn watch_count(&self) -> usize {
        self.watches.len()
    }
}
