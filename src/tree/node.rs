// src/tree/node.rs

//! The per-directory watch node.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::events::{Action, FileEvent};
use crate::snapshot::DirSnapshot;
use crate::tree::guard::{evaluate_candidate, GuardDecision};
use crate::tree::{PollContext, TreePaths};

/// One node of the reconciliation tree, watching exactly one directory.
///
/// A node owns its children; dropping a subtree happens only through
/// [`DirNode::teardown`], which is explicit because teardown may have to
/// emit deletion events and event emission from `Drop` would be both
/// surprising and unorderable.
#[derive(Debug)]
pub(crate) struct DirNode {
    snapshot: DirSnapshot,
    /// Bare child directory name -> owned child node.
    children: HashMap<String, DirNode>,
    /// Set once the directory this node represents is gone from disk;
    /// propagated to all children during teardown.
    deleted: bool,
}

impl DirNode {
    /// Node over an existing directory: the baseline is its current content,
    /// so registration is silent and the next poll reports only changes.
    pub fn open(path: PathBuf, ctx: &PollContext<'_>, tree: &mut TreePaths) -> Self {
        let mut node = Self::with_empty_baseline(path, tree);
        node.snapshot.scan(ctx.fs, ctx.scan);
        node
    }

    /// Node over a directory that just appeared: the baseline stays empty so
    /// the immediate first poll reports the entire present content as
    /// creations.
    pub fn for_created(path: PathBuf, tree: &mut TreePaths) -> Self {
        Self::with_empty_baseline(path, tree)
    }

    fn with_empty_baseline(path: PathBuf, tree: &mut TreePaths) -> Self {
        tree.insert(path.clone());
        Self {
            snapshot: DirSnapshot::empty(path),
            children: HashMap::new(),
            deleted: false,
        }
    }

    pub fn path(&self) -> &Path {
        self.snapshot.dir()
    }

    pub fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    /// Seed child nodes for every existing subdirectory, depth-first, so a
    /// directory's own watch exists before its descendants are considered.
    /// Silent: freshly opened children baseline their content, no events.
    pub fn populate(&mut self, ctx: &PollContext<'_>, tree: &mut TreePaths) {
        if !ctx.recursive {
            return;
        }
        for name in self.snapshot.dir_entry_names() {
            let candidate = self.path().join(&name);
            match evaluate_candidate(&candidate, tree, ctx) {
                GuardDecision::Accept(resolved) => {
                    let mut child = DirNode::open(resolved, ctx, tree);
                    child.populate(ctx, tree);
                    self.children.insert(name, child);
                }
                GuardDecision::Reject(reason) => {
                    ctx.stats.count_guard_rejection();
                    debug!(?candidate, %reason, "not watching directory");
                }
            }
        }
    }

    /// One poll pass over this node and its subtree: diff, translate into
    /// events, mutate the tree, then descend into all current children.
    pub fn poll(&mut self, ctx: &PollContext<'_>, tree: &mut TreePaths) {
        let diff = self.snapshot.scan(ctx.fs, ctx.scan);

        if diff.changed() {
            for entry in &diff.files_created {
                self.emit(ctx, &entry.name, Action::Add, None);
            }
            for entry in &diff.files_modified {
                self.emit(ctx, &entry.name, Action::Modified, None);
            }
            for entry in &diff.files_deleted {
                self.emit(ctx, &entry.name, Action::Delete, None);
            }
            for (old_name, entry) in &diff.files_moved {
                self.emit(ctx, &entry.name, Action::Moved, Some(old_name.as_str()));
            }

            for entry in &diff.dirs_created {
                self.emit(ctx, &entry.name, Action::Add, None);
                self.handle_dir_created(&entry.name, ctx, tree);
            }
            for entry in &diff.dirs_modified {
                self.emit(ctx, &entry.name, Action::Modified, None);
            }
            for entry in &diff.dirs_deleted {
                self.emit(ctx, &entry.name, Action::Delete, None);
                self.handle_dir_removed(&entry.name, ctx, tree);
            }
            for (old_name, entry) in &diff.dirs_moved {
                self.emit(ctx, &entry.name, Action::Moved, Some(old_name.as_str()));
                self.handle_dir_moved(old_name, &entry.name, ctx, tree);
            }
        }

        for child in self.children.values_mut() {
            child.poll(ctx, tree);
        }
    }

    /// Whether `path` is watched by this node or any descendant.
    pub fn path_in_watches(&self, path: &Path) -> bool {
        if self.path() == path {
            return true;
        }
        self.children
            .values()
            .any(|child| child.path_in_watches(path))
    }

    /// Release this subtree. If the node was marked deleted, a final scan
    /// reports everything still recorded in the snapshot as deleted, and the
    /// flag propagates so every descendant does the same. Without the flag
    /// this is a silent release (watch cancellation).
    pub fn teardown(mut self, ctx: &PollContext<'_>, tree: &mut TreePaths) {
        if self.deleted {
            let diff = self.snapshot.scan(ctx.fs, ctx.scan);
            if !diff.still_exists() {
                for entry in &diff.files_deleted {
                    self.emit(ctx, &entry.name, Action::Delete, None);
                }
                for entry in &diff.dirs_deleted {
                    self.emit(ctx, &entry.name, Action::Delete, None);
                }
            }
        }

        tree.remove(&self.path().to_path_buf());

        let deleted = self.deleted;
        for (_, mut child) in self.children.drain() {
            if deleted {
                child.deleted = true;
            }
            child.teardown(ctx, tree);
        }
    }

    /// Collect the paths of this node and every descendant.
    pub fn node_paths(&self, out: &mut Vec<PathBuf>) {
        out.push(self.path().to_path_buf());
        for child in self.children.values() {
            child.node_paths(out);
        }
    }

    pub(crate) fn emit(
        &self,
        ctx: &PollContext<'_>,
        name: &str,
        action: Action,
        old_name: Option<&str>,
    ) {
        ctx.stats.count_event();
        ctx.sink.handle_event(FileEvent {
            watch_id: ctx.id,
            dir: self.path().to_path_buf(),
            name: name.to_string(),
            action,
            old_name: old_name.map(String::from),
        });
    }

    pub(crate) fn children_mut(&mut self) -> &mut HashMap<String, DirNode> {
        &mut self.children
    }

    pub(crate) fn set_path(&mut self, path: PathBuf) {
        self.snapshot.set_dir(path);
    }
}
