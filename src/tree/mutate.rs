// src/tree/mutate.rs

//! Tree mutations driven by directory-level diff entries.
//!
//! All three operations tolerate a child name that is not in the map: the
//! filesystem may have resolved an intermediate state between two polls, or
//! the directory never passed the symlink guard. Such misses are counted on
//! the watch's stats instead of being swallowed silently.

use std::path::PathBuf;

use tracing::debug;

use crate::tree::guard::{evaluate_candidate, GuardDecision};
use crate::tree::node::DirNode;
use crate::tree::{PollContext, TreePaths};

impl DirNode {
    /// A directory named `name` appeared in this node. Consult the guard and,
    /// if accepted, grow a child node for it and poll that child immediately
    /// so content that already exists is reported as created.
    pub(crate) fn handle_dir_created(
        &mut self,
        name: &str,
        ctx: &PollContext<'_>,
        tree: &mut TreePaths,
    ) {
        if !ctx.recursive {
            return;
        }
        let candidate = self.path().join(name);
        match evaluate_candidate(&candidate, tree, ctx) {
            GuardDecision::Accept(resolved) => {
                let mut child = DirNode::for_created(resolved, tree);
                child.poll(ctx, tree);
                self.children_mut().insert(name.to_string(), child);
            }
            GuardDecision::Reject(reason) => {
                ctx.stats.count_guard_rejection();
                debug!(?candidate, %reason, "not watching created directory");
            }
        }
    }

    /// A directory named `name` disappeared from this node. Tear its node
    /// down with the deleted flag set so the cascade reports everything that
    /// was watched inside it.
    pub(crate) fn handle_dir_removed(
        &mut self,
        name: &str,
        ctx: &PollContext<'_>,
        tree: &mut TreePaths,
    ) {
        match self.children_mut().remove(name) {
            Some(mut child) => {
                child.mark_deleted();
                child.teardown(ctx, tree);
            }
            None => {
                ctx.stats.count_orphan_removal();
                debug!(
                    dir = ?self.path(),
                    name,
                    "removed directory had no watch node"
                );
            }
        }
    }

    /// A directory was renamed within this node. The child node and its
    /// subtree survive; only the map key and the recorded paths change.
    pub(crate) fn handle_dir_moved(
        &mut self,
        old_name: &str,
        new_name: &str,
        ctx: &PollContext<'_>,
        tree: &mut TreePaths,
    ) {
        match self.children_mut().remove(old_name) {
            Some(mut child) => {
                // A child redirected through a symlink watches the link
                // target; renaming the link entry does not move the target.
                if child.path() == self.path().join(old_name) {
                    child.rebase(self.path().join(new_name), tree);
                }
                self.children_mut().insert(new_name.to_string(), child);
            }
            None => {
                ctx.stats.count_orphan_move();
                debug!(
                    dir = ?self.path(),
                    old_name,
                    new_name,
                    "moved directory had no watch node"
                );
            }
        }
    }

    /// Rewrite this node's recorded path and, transitively, every
    /// descendant's, keeping link-redirected children untouched.
    fn rebase(&mut self, new_path: PathBuf, tree: &mut TreePaths) {
        let old_path = self.path().to_path_buf();
        tree.remove(&old_path);
        tree.insert(new_path.clone());
        self.set_path(new_path.clone());

        let child_names: Vec<String> = self.children_mut().keys().cloned().collect();
        for name in child_names {
            let expected = old_path.join(&name);
            let Some(child) = self.children_mut().get_mut(&name) else {
                continue;
            };
            if child.path() == expected {
                child.rebase(new_path.join(&name), tree);
            }
        }
    }
}
