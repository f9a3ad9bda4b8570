// src/snapshot/diff.rs

use crate::snapshot::entry::EntryInfo;

/// Categorized comparison of two directory listings.
///
/// Moved entries are pairs of old bare name and new entry; all vectors are
/// sorted by entry name so consumers observe a deterministic order.
#[derive(Debug, Default)]
pub struct SnapshotDiff {
    pub files_created: Vec<EntryInfo>,
    pub files_modified: Vec<EntryInfo>,
    pub files_deleted: Vec<EntryInfo>,
    pub files_moved: Vec<(String, EntryInfo)>,

    pub dirs_created: Vec<EntryInfo>,
    pub dirs_modified: Vec<EntryInfo>,
    pub dirs_deleted: Vec<EntryInfo>,
    pub dirs_moved: Vec<(String, EntryInfo)>,

    dir_exists: bool,
}

impl SnapshotDiff {
    pub(crate) fn new(dir_exists: bool) -> Self {
        Self {
            dir_exists,
            ..Self::default()
        }
    }

    /// Whether anything changed since the previous scan.
    pub fn changed(&self) -> bool {
        !(self.files_created.is_empty()
            && self.files_modified.is_empty()
            && self.files_deleted.is_empty()
            && self.files_moved.is_empty()
            && self.dirs_created.is_empty()
            && self.dirs_modified.is_empty()
            && self.dirs_deleted.is_empty()
            && self.dirs_moved.is_empty())
    }

    /// Whether the scanned directory itself still existed at scan time.
    pub fn still_exists(&self) -> bool {
        self.dir_exists
    }

    pub(crate) fn sort(&mut self) {
        let by_name = |a: &EntryInfo, b: &EntryInfo| a.name.cmp(&b.name);
        self.files_created.sort_by(by_name);
        self.files_modified.sort_by(by_name);
        self.files_deleted.sort_by(by_name);
        self.files_moved.sort_by(|a, b| a.1.name.cmp(&b.1.name));
        self.dirs_created.sort_by(by_name);
        self.dirs_modified.sort_by(by_name);
        self.dirs_deleted.sort_by(by_name);
        self.dirs_moved.sort_by(|a, b| a.1.name.cmp(&b.1.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_diff_reports_unchanged() {
        let diff = SnapshotDiff::new(true);
        assert!(!diff.changed());
        assert!(diff.still_exists());
    }
}
