// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

pub mod mock;

/// Metadata for a single directory entry, as the scanner needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<SystemTime>,
    /// Stable per-file identity (inode on Unix), taken without following
    /// links. `None` where the platform has no usable equivalent; rename
    /// pairing degrades to delete+create in that case.
    pub file_id: Option<u64>,
}

/// Abstract filesystem interface.
///
/// The engine only ever reads through this trait, which keeps the whole
/// reconciliation core runnable against [`mock::MockFileSystem`] in tests.
pub trait FileSystem: Send + Sync + Debug {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    /// Return a list of entries in a directory. Returns full paths.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Metadata for one entry. Kind/size/mtime follow symlinks (a link to a
    /// directory counts as a directory); `file_id` does not.
    fn metadata(&self, path: &Path) -> Result<FileMeta>;

    /// If `path` is a symbolic link, its fully resolved real target.
    ///
    /// `None` for plain entries and for dangling links (a target that cannot
    /// be resolved is treated as "not a followable link").
    fn symlink_target(&self, path: &Path) -> Option<PathBuf>;

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).with_context(|| format!("canonicalizing {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))? {
            let entry = entry?;
            entries.push(entry.path());
        }
        Ok(entries)
    }

    fn metadata(&self, path: &Path) -> Result<FileMeta> {
        let no_follow =
            fs::symlink_metadata(path).with_context(|| format!("stat (no-follow) {:?}", path))?;
        let file_id = file_id_of(&no_follow);

        // A dangling link has no followable metadata; report it as a plain
        // file-shaped entry so it still shows up in diffs.
        match fs::metadata(path) {
            Ok(m) => Ok(FileMeta {
                is_dir: m.is_dir(),
                size: m.len(),
                modified: m.modified().ok(),
                file_id,
            }),
            Err(_) => Ok(FileMeta {
                is_dir: false,
                size: no_follow.len(),
                modified: no_follow.modified().ok(),
                file_id,
            }),
        }
    }

    fn symlink_target(&self, path: &Path) -> Option<PathBuf> {
        let meta = fs::symlink_metadata(path).ok()?;
        if !meta.file_type().is_symlink() {
            return None;
        }
        fs::canonicalize(path).ok()
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let file = fs::File::open(path).with_context(|| format!("opening file {:?}", path))?;
        Ok(Box::new(file))
    }
}

#[cfg(unix)]
fn file_id_of(meta: &fs::Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(meta.ino())
}

#[cfg(not(unix))]
fn file_id_of(_meta: &fs::Metadata) -> Option<u64> {
    None
}
