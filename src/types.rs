// src/types.rs

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of a registered watch, unique within one [`WatchForest`].
///
/// Every event delivered to a sink carries the id of the watch that produced
/// it, so one sink can serve several watches.
///
/// [`WatchForest`]: crate::forest::WatchForest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(pub u64);

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Policy for following symbolic links into new watch nodes.
///
/// A link that is not followed is simply left unwatched; events for the link
/// entry itself (create/delete/rename in its containing directory) still fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkPolicy {
    /// Whether directory symlinks may be followed at all.
    pub follow_symlinks: bool,
    /// Whether a followed link may point outside the watch root.
    pub allow_out_of_root: bool,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            allow_out_of_root: false,
        }
    }
}

impl LinkPolicy {
    /// Decide whether a link whose resolved target is `target` may be watched
    /// under the watch rooted at `root`.
    pub fn link_allowed(&self, root: &Path, target: &Path) -> bool {
        self.follow_symlinks && (self.allow_out_of_root || target.starts_with(root))
    }
}

/// Per-watch behaviour knobs supplied at registration time.
#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    pub recursive: bool,
    pub link_policy: LinkPolicy,
    /// Confirm mtime/size deltas with a content hash before reporting a
    /// modification. Costs one file read per suspected change.
    pub content_hash: bool,
    /// Glob patterns (relative to the watch root, forward slashes) whose
    /// matches are invisible to the watch.
    pub exclude: Vec<String>,
}

impl WatchOptions {
    pub fn recursive() -> Self {
        Self {
            recursive: true,
            ..Self::default()
        }
    }
}

/// Counters for a single watch.
///
/// The orphan counters record tree mutations that referenced a child the tree
/// did not have. Those are tolerated no-ops (the filesystem may already have
/// resolved an intermediate state between two polls, or the child never
/// passed the symlink guard), but they are kept observable here instead of
/// being swallowed.
#[derive(Debug, Default)]
pub struct WatchStats {
    pub(crate) events_emitted: AtomicU64,
    pub(crate) guard_rejections: AtomicU64,
    pub(crate) orphan_removals: AtomicU64,
    pub(crate) orphan_moves: AtomicU64,
}

impl WatchStats {
    pub(crate) fn count_event(&self) {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn count_guard_rejection(&self) {
        self.guard_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn count_orphan_removal(&self) {
        self.orphan_removals.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn count_orphan_move(&self) {
        self.orphan_moves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
            guard_rejections: self.guard_rejections.load(Ordering::Relaxed),
            orphan_removals: self.orphan_removals.load(Ordering::Relaxed),
            orphan_moves: self.orphan_moves.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`WatchStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub events_emitted: u64,
    pub guard_rejections: u64,
    pub orphan_removals: u64,
    pub orphan_moves: u64,
}
