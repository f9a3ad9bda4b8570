#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory tree for integration tests.
///
/// All helpers take paths relative to the tree root and panic on IO errors;
/// a broken fixture should fail the test immediately.
pub struct TempTree {
    root: TempDir,
}

impl TempTree {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("creating temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    /// Create (or overwrite) a file, creating parent directories as needed.
    pub fn file(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("creating parent dirs");
        }
        fs::write(&path, contents).expect("writing file");
        path
    }

    pub fn dir(&self, rel: &str) -> PathBuf {
        let path = self.join(rel);
        fs::create_dir_all(&path).expect("creating dir");
        path
    }

    /// Remove a file or a whole directory tree.
    pub fn remove(&self, rel: &str) {
        let path = self.join(rel);
        if path.is_dir() {
            fs::remove_dir_all(&path).expect("removing dir tree");
        } else {
            fs::remove_file(&path).expect("removing file");
        }
    }

    pub fn rename(&self, from: &str, to: &str) {
        fs::rename(self.join(from), self.join(to)).expect("renaming");
    }

    /// Create a symlink at `link` pointing to `target` (both relative to the
    /// tree root unless `target` is absolute).
    #[cfg(unix)]
    pub fn symlink_dir(&self, target: &str, link: &str) {
        let target = if Path::new(target).is_absolute() {
            PathBuf::from(target)
        } else {
            self.join(target)
        };
        std::os::unix::fs::symlink(target, self.join(link)).expect("creating symlink");
    }

    /// List every directory under the root (the root included), as absolute
    /// paths, without following symlinks.
    pub fn dirs_on_disk(&self) -> Vec<PathBuf> {
        let mut out = Vec::new();
        collect_dirs(self.path(), &mut out);
        out.sort();
        out
    }
}

impl Default for TempTree {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_dirs(dir: &Path, out: &mut Vec<PathBuf>) {
    out.push(dir.to_path_buf());
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(meta) = fs::symlink_metadata(&path) else {
            continue;
        };
        if meta.is_dir() {
            collect_dirs(&path, out);
        }
    }
}
