// src/tree/guard.rs

//! The symlink guard: decides whether a candidate directory may become a
//! watch node.
//!
//! Accepting a symlink means watching its resolved target instead of the
//! link path. The guard refuses any candidate whose resolved path is already
//! watched, in this tree or any sibling watch, which is what keeps the tree
//! finite under cyclic and self-referential link topologies.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::tree::{PollContext, TreePaths};

/// Outcome of evaluating one candidate directory.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum GuardDecision {
    /// Watch this resolved path (the target for links, the candidate itself
    /// otherwise).
    Accept(PathBuf),
    Reject(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RejectReason {
    /// The resolved path is already a node of this tree.
    WatchedInTree,
    /// The resolved path is covered by another watch of the forest.
    WatchedElsewhere,
    /// The link policy refuses to follow this link.
    LinkRefused,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::WatchedInTree => "already watched in this tree",
            RejectReason::WatchedElsewhere => "already watched by another watch",
            RejectReason::LinkRefused => "link refused by policy",
        };
        f.write_str(s)
    }
}

pub(crate) fn evaluate_candidate(
    candidate: &Path,
    tree: &TreePaths,
    ctx: &PollContext<'_>,
) -> GuardDecision {
    match ctx.fs.symlink_target(candidate) {
        Some(target) => {
            if tree.contains(&target) {
                GuardDecision::Reject(RejectReason::WatchedInTree)
            } else if ctx.siblings.path_in_watches(&target) {
                GuardDecision::Reject(RejectReason::WatchedElsewhere)
            } else if !ctx.policy.link_allowed(ctx.watch_root, &target) {
                GuardDecision::Reject(RejectReason::LinkRefused)
            } else {
                GuardDecision::Accept(target)
            }
        }
        None => {
            if tree.contains(candidate) {
                GuardDecision::Reject(RejectReason::WatchedInTree)
            } else if ctx.siblings.path_in_watches(candidate) {
                GuardDecision::Reject(RejectReason::WatchedElsewhere)
            } else {
                GuardDecision::Accept(candidate.to_path_buf())
            }
        }
    }
}
