// src/fs/mock.rs

use super::{FileMeta, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

/// Maximum symlink hops before a chain is declared unresolvable.
const MAX_LINK_DEPTH: usize = 16;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File {
        content: Vec<u8>,
        modified: SystemTime,
        file_id: u64,
    },
    Dir {
        children: Vec<String>,
        modified: SystemTime,
        file_id: u64,
    },
    Symlink {
        target: PathBuf,
    },
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    next_file_id: u64,
    /// Logical clock; every mutation advances it by one second so mtime
    /// comparisons behave deterministically in tests.
    clock: u64,
}

/// In-memory filesystem with symlink support.
///
/// All mutation helpers take `&self`; the state sits behind a mutex so tests
/// can hold the mock and hand clones to the code under test.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let fs = Self::default();
        fs.add_dir("/");
        fs
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        ensure_dir(&mut state, &path);
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        let now = tick(&mut state);
        if matches!(state.entries.get(&path), Some(MockEntry::File { .. })) {
            // Overwrite keeps identity, like writing to an existing file.
            if let Some(MockEntry::File {
                content: existing,
                modified,
                ..
            }) = state.entries.get_mut(&path)
            {
                *existing = content.into();
                *modified = now;
            }
        } else {
            let file_id = next_id(&mut state);
            state.entries.insert(
                path.clone(),
                MockEntry::File {
                    content: content.into(),
                    modified: now,
                    file_id,
                },
            );
            link_into_parent(&mut state, &path);
        }
        touch_parent(&mut state, &path, now);
    }

    pub fn add_symlink(&self, path: impl AsRef<Path>, target: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        let now = tick(&mut state);
        state.entries.insert(
            path.clone(),
            MockEntry::Symlink {
                target: target.as_ref().to_path_buf(),
            },
        );
        link_into_parent(&mut state, &path);
        touch_parent(&mut state, &path, now);
    }

    /// Remove an entry; directories are removed with everything below them.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        let now = tick(&mut state);
        let doomed: Vec<PathBuf> = state
            .entries
            .keys()
            .filter(|p| *p == &path || p.starts_with(&path))
            .cloned()
            .collect();
        for p in doomed {
            state.entries.remove(&p);
        }
        unlink_from_parent(&mut state, &path);
        touch_parent(&mut state, &path, now);
    }

    /// Rename an entry, preserving file identity (and subtree contents for
    /// directories), like `std::fs::rename` within one filesystem.
    pub fn rename(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) {
        let from = from.as_ref().to_path_buf();
        let to = to.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        let now = tick(&mut state);

        let moved: Vec<(PathBuf, MockEntry)> = state
            .entries
            .iter()
            .filter(|(p, _)| *p == &from || p.starts_with(&from))
            .map(|(p, e)| (p.clone(), e.clone()))
            .collect();
        for (p, _) in &moved {
            state.entries.remove(p);
        }
        for (p, e) in moved {
            let rebased = if p == from {
                to.clone()
            } else {
                to.join(p.strip_prefix(&from).unwrap())
            };
            state.entries.insert(rebased, e);
        }

        unlink_from_parent(&mut state, &from);
        link_into_parent(&mut state, &to);
        touch_parent(&mut state, &from, now);
        touch_parent(&mut state, &to, now);
    }

    /// Bump an entry's mtime without changing its content.
    pub fn touch(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        let now = tick(&mut state);
        match state.entries.get_mut(&path) {
            Some(MockEntry::File { modified, .. }) | Some(MockEntry::Dir { modified, .. }) => {
                *modified = now;
            }
            _ => {}
        }
    }

    fn resolve(&self, state: &MockState, path: &Path) -> Option<PathBuf> {
        let mut current = path.to_path_buf();
        for _ in 0..MAX_LINK_DEPTH {
            match state.entries.get(&current) {
                Some(MockEntry::Symlink { target }) => current = target.clone(),
                Some(_) => return Some(current),
                None => return None,
            }
        }
        None
    }
}

fn tick(state: &mut MockState) -> SystemTime {
    state.clock += 1;
    SystemTime::UNIX_EPOCH + Duration::from_secs(state.clock)
}

fn next_id(state: &mut MockState) -> u64 {
    state.next_file_id += 1;
    state.next_file_id
}

fn ensure_dir(state: &mut MockState, path: &Path) {
    if state.entries.contains_key(path) {
        return;
    }
    let file_id = next_id(state);
    let now = SystemTime::UNIX_EPOCH + Duration::from_secs(state.clock);
    state.entries.insert(
        path.to_path_buf(),
        MockEntry::Dir {
            children: Vec::new(),
            modified: now,
            file_id,
        },
    );
    link_into_parent(state, path);
}

fn link_into_parent(state: &mut MockState, path: &Path) {
    let Some(parent) = path.parent().map(Path::to_path_buf) else {
        return;
    };
    if parent.as_os_str().is_empty() || parent == path {
        return;
    }
    ensure_dir(state, &parent);
    let Some(name) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
        return;
    };
    if let Some(MockEntry::Dir { children, .. }) = state.entries.get_mut(&parent) {
        if !children.contains(&name) {
            children.push(name);
        }
    }
}

fn unlink_from_parent(state: &mut MockState, path: &Path) {
    let Some(parent) = path.parent().map(Path::to_path_buf) else {
        return;
    };
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return;
    };
    if let Some(MockEntry::Dir { children, .. }) = state.entries.get_mut(&parent) {
        children.retain(|c| c != name);
    }
}

fn touch_parent(state: &mut MockState, path: &Path, now: SystemTime) {
    let Some(parent) = path.parent().map(Path::to_path_buf) else {
        return;
    };
    if let Some(MockEntry::Dir { modified, .. }) = state.entries.get_mut(&parent) {
        *modified = now;
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        state.entries.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        match self.resolve(&state, path) {
            Some(real) => matches!(state.entries.get(&real), Some(MockEntry::Dir { .. })),
            None => false,
        }
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        let state = self.state.lock().unwrap();
        self.resolve(&state, path)
            .ok_or_else(|| anyhow!("no such entry: {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.state.lock().unwrap();
        let real = self
            .resolve(&state, path)
            .ok_or_else(|| anyhow!("no such entry: {:?}", path))?;
        match state.entries.get(&real) {
            Some(MockEntry::Dir { children, .. }) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("not a directory: {:?}", path)),
        }
    }

    fn metadata(&self, path: &Path) -> Result<FileMeta> {
        let state = self.state.lock().unwrap();
        let entry = state
            .entries
            .get(path)
            .ok_or_else(|| anyhow!("no such entry: {:?}", path))?;

        // Links report their target's shape but no identity of their own.
        let (resolved, file_id) = match entry {
            MockEntry::Symlink { .. } => {
                let real = self
                    .resolve(&state, path)
                    .ok_or_else(|| anyhow!("dangling link: {:?}", path))?;
                (state.entries.get(&real).unwrap().clone(), None)
            }
            other => {
                let id = match other {
                    MockEntry::File { file_id, .. } | MockEntry::Dir { file_id, .. } => {
                        Some(*file_id)
                    }
                    MockEntry::Symlink { .. } => None,
                };
                (other.clone(), id)
            }
        };

        Ok(match resolved {
            MockEntry::File {
                content, modified, ..
            } => FileMeta {
                is_dir: false,
                size: content.len() as u64,
                modified: Some(modified),
                file_id,
            },
            MockEntry::Dir { modified, .. } => FileMeta {
                is_dir: true,
                size: 0,
                modified: Some(modified),
                file_id,
            },
            MockEntry::Symlink { .. } => unreachable!("resolve() never returns a symlink"),
        })
    }

    fn symlink_target(&self, path: &Path) -> Option<PathBuf> {
        let state = self.state.lock().unwrap();
        match state.entries.get(path) {
            Some(MockEntry::Symlink { .. }) => self.resolve(&state, path),
            _ => None,
        }
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let state = self.state.lock().unwrap();
        let real = self
            .resolve(&state, path)
            .ok_or_else(|| anyhow!("no such entry: {:?}", path))?;
        match state.entries.get(&real) {
            Some(MockEntry::File { content, .. }) => Ok(Box::new(Cursor::new(content.clone()))),
            Some(MockEntry::Dir { .. }) => Err(anyhow!("is a directory: {:?}", path)),
            _ => Err(anyhow!("no such entry: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_preserves_file_identity() {
        let fs = MockFileSystem::new();
        fs.add_file("/d/a.txt", "hello");
        let before = fs.metadata(Path::new("/d/a.txt")).unwrap();

        fs.rename("/d/a.txt", "/d/b.txt");

        assert!(!fs.exists(Path::new("/d/a.txt")));
        let after = fs.metadata(Path::new("/d/b.txt")).unwrap();
        assert_eq!(before.file_id, after.file_id);
    }

    #[test]
    fn rename_moves_directory_contents() {
        let fs = MockFileSystem::new();
        fs.add_file("/d/sub/leaf.txt", "x");
        fs.rename("/d/sub", "/d/renamed");

        assert!(fs.is_dir(Path::new("/d/renamed")));
        assert!(fs.exists(Path::new("/d/renamed/leaf.txt")));
        assert!(!fs.exists(Path::new("/d/sub/leaf.txt")));
    }

    #[test]
    fn symlink_chain_resolves_to_real_dir() {
        let fs = MockFileSystem::new();
        fs.add_dir("/real");
        fs.add_symlink("/a", "/b");
        fs.add_symlink("/b", "/real");

        assert_eq!(
            fs.symlink_target(Path::new("/a")),
            Some(PathBuf::from("/real"))
        );
        assert!(fs.is_dir(Path::new("/a")));
    }

    #[test]
    fn self_referential_link_does_not_loop() {
        let fs = MockFileSystem::new();
        fs.add_symlink("/loop", "/loop");
        assert_eq!(fs.symlink_target(Path::new("/loop")), None);
        assert!(!fs.is_dir(Path::new("/loop")));
    }
}
