// src/snapshot/scan.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::fs::FileSystem;
use crate::snapshot::diff::SnapshotDiff;
use crate::snapshot::entry::EntryInfo;
use crate::snapshot::hash::compute_file_hash;
use crate::snapshot::ScanOptions;
use crate::tree::path_resolve::entry_name;

/// The recorded listing of one directory.
#[derive(Debug)]
pub struct DirSnapshot {
    dir: PathBuf,
    entries: HashMap<String, EntryInfo>,
}

impl DirSnapshot {
    /// A snapshot with an empty baseline; the first `scan` will report the
    /// directory's entire current content as created.
    pub fn empty(dir: PathBuf) -> Self {
        Self {
            dir,
            entries: HashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Re-point the snapshot at a new directory path, keeping the recorded
    /// listing. Used when the directory was renamed; the entries are still
    /// valid because they are keyed by bare name.
    pub fn set_dir(&mut self, dir: PathBuf) {
        self.dir = dir;
    }

    pub fn dir_entry_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .values()
            .filter(|e| e.is_dir())
            .map(|e| e.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Re-read the directory, replace the recorded listing and return the
    /// categorized comparison against the previous one.
    ///
    /// Scanning never fails: an unreadable or vanished directory is treated
    /// as empty (its previous entries all show up as deleted) and the
    /// returned diff reports `still_exists() == false` when the directory
    /// itself is gone.
    pub fn scan(&mut self, fs: &dyn FileSystem, options: &ScanOptions) -> SnapshotDiff {
        let dir_exists = fs.is_dir(&self.dir);
        let current = if dir_exists {
            self.read_current(fs, options)
        } else {
            HashMap::new()
        };

        let mut diff = SnapshotDiff::new(dir_exists);

        for (name, new) in &current {
            match self.entries.get(name) {
                None => push_created(&mut diff, new.clone()),
                Some(old) if old.is_dir() != new.is_dir() => {
                    // The name was reused for an entry of the other kind
                    // between two polls; report it as a replacement.
                    push_deleted(&mut diff, old.clone());
                    push_created(&mut diff, new.clone());
                }
                Some(old) => {
                    if is_modified(old, new, options) {
                        push_modified(&mut diff, new.clone());
                    }
                }
            }
        }

        for (name, old) in &self.entries {
            if !current.contains_key(name) {
                push_deleted(&mut diff, old.clone());
            }
        }

        pair_moves(&mut diff.files_deleted, &mut diff.files_created, &mut diff.files_moved);
        pair_moves(&mut diff.dirs_deleted, &mut diff.dirs_created, &mut diff.dirs_moved);

        diff.sort();
        self.entries = current;
        diff
    }

    fn read_current(
        &self,
        fs: &dyn FileSystem,
        options: &ScanOptions,
    ) -> HashMap<String, EntryInfo> {
        let paths = match fs.read_dir(&self.dir) {
            Ok(paths) => paths,
            Err(err) => {
                debug!(dir = ?self.dir, error = %err, "directory became unreadable; treating as empty");
                return HashMap::new();
            }
        };

        let mut current = HashMap::with_capacity(paths.len());
        for path in paths {
            let Some(name) = entry_name(&path) else {
                warn!(?path, "skipping entry with non-UTF-8 name");
                continue;
            };
            if options.is_excluded(&self.dir, &name) {
                continue;
            }
            // An entry can vanish between listing and stat; it will be
            // reported once it is observable again.
            let Ok(meta) = fs.metadata(&path) else {
                debug!(?path, "entry disappeared during scan");
                continue;
            };

            let content_hash = if options.content_hash() && !meta.is_dir {
                self.entry_hash(fs, &path, &name, &meta)
            } else {
                None
            };

            current.insert(
                name.clone(),
                EntryInfo {
                    name,
                    meta,
                    content_hash,
                },
            );
        }
        current
    }

    /// Content hash for one file, reusing the recorded hash when size and
    /// mtime are unchanged so unchanged files are never re-read.
    fn entry_hash(
        &self,
        fs: &dyn FileSystem,
        path: &Path,
        name: &str,
        meta: &crate::fs::FileMeta,
    ) -> Option<String> {
        if let Some(old) = self.entries.get(name) {
            if !old.is_dir()
                && old.meta.size == meta.size
                && old.meta.modified == meta.modified
                && old.content_hash.is_some()
            {
                return old.content_hash.clone();
            }
        }
        match compute_file_hash(fs, path) {
            Ok(hash) => Some(hash),
            Err(err) => {
                debug!(?path, error = %err, "could not hash file");
                None
            }
        }
    }
}

fn is_modified(old: &EntryInfo, new: &EntryInfo, options: &ScanOptions) -> bool {
    if new.is_dir() {
        return old.meta.modified != new.meta.modified;
    }
    if old.meta.size == new.meta.size && old.meta.modified == new.meta.modified {
        return false;
    }
    // In content-hash mode a touched-but-identical file is not a change.
    if options.content_hash() {
        if let (Some(old_hash), Some(new_hash)) = (&old.content_hash, &new.content_hash) {
            return old_hash != new_hash;
        }
    }
    true
}

fn push_created(diff: &mut SnapshotDiff, entry: EntryInfo) {
    if entry.is_dir() {
        diff.dirs_created.push(entry);
    } else {
        diff.files_created.push(entry);
    }
}

fn push_modified(diff: &mut SnapshotDiff, entry: EntryInfo) {
    if entry.is_dir() {
        diff.dirs_modified.push(entry);
    } else {
        diff.files_modified.push(entry);
    }
}

fn push_deleted(diff: &mut SnapshotDiff, entry: EntryInfo) {
    if entry.is_dir() {
        diff.dirs_deleted.push(entry);
    } else {
        diff.files_deleted.push(entry);
    }
}

/// Pair deleted and created entries of the same kind that share a file
/// identity into rename pairs. Entries without an identity stay as
/// delete+create.
fn pair_moves(
    deleted: &mut Vec<EntryInfo>,
    created: &mut Vec<EntryInfo>,
    moved: &mut Vec<(String, EntryInfo)>,
) {
    let mut i = 0;
    while i < deleted.len() {
        let matched = deleted[i].meta.file_id.and_then(|id| {
            created
                .iter()
                .position(|c| c.meta.file_id == Some(id))
        });
        match matched {
            Some(j) => {
                let old = deleted.remove(i);
                let new = created.remove(j);
                moved.push((old.name, new));
            }
            None => i += 1,
        }
    }
}
