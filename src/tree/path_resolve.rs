// src/tree/path_resolve.rs

//! Path handling helpers for the watch tree.

use std::path::{Path, PathBuf};

use crate::errors::{PollwatchError, Result};

/// Determine a node's absolute directory path.
///
/// Guard-resolved candidates arrive absolute and are used verbatim; bare
/// child names from the diff engine are resolved against the parent node's
/// recorded path. A relative path with no parent to resolve against is a
/// configuration error (only the tree root could hit this, and root paths
/// are validated at registration).
pub fn resolve_node_path(parent: Option<&Path>, requested: &Path) -> Result<PathBuf> {
    if requested.is_absolute() {
        return Ok(requested.to_path_buf());
    }
    match parent {
        Some(parent) => Ok(parent.join(requested)),
        None => Err(PollwatchError::UnresolvablePath(requested.to_path_buf())),
    }
}

/// Strip a single trailing separator, e.g. `"/a/b/"` -> `"/a/b"`.
///
/// User-supplied watch roots often carry one; recorded paths never do.
pub fn strip_trailing_separator(path: &str) -> &str {
    let stripped = path
        .strip_suffix('/')
        .or_else(|| path.strip_suffix('\\'))
        .unwrap_or(path);
    // Never reduce a filesystem root to the empty string.
    if stripped.is_empty() { path } else { stripped }
}

/// Bare UTF-8 entry name of a path, if it has one.
pub fn entry_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_paths_are_used_verbatim() {
        let resolved =
            resolve_node_path(Some(Path::new("/parent")), Path::new("/elsewhere/dir")).unwrap();
        assert_eq!(resolved, PathBuf::from("/elsewhere/dir"));
    }

    #[test]
    fn bare_names_resolve_against_the_parent() {
        let resolved = resolve_node_path(Some(Path::new("/parent")), Path::new("child")).unwrap();
        assert_eq!(resolved, PathBuf::from("/parent/child"));
    }

    #[test]
    fn relative_path_without_parent_is_fatal() {
        let err = resolve_node_path(None, Path::new("orphan")).unwrap_err();
        assert!(matches!(err, PollwatchError::UnresolvablePath(_)));
    }

    #[test]
    fn trailing_separators_are_stripped() {
        assert_eq!(strip_trailing_separator("/a/b/"), "/a/b");
        assert_eq!(strip_trailing_separator("/a/b"), "/a/b");
        assert_eq!(strip_trailing_separator("/"), "/");
    }

    #[test]
    fn entry_name_requires_utf8() {
        assert_eq!(entry_name(Path::new("/a/b.txt")), Some("b.txt".to_string()));
        assert_eq!(entry_name(Path::new("/")), None);
    }
}
