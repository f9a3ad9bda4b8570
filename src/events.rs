// src/events.rs

//! The event stream produced by the engine.
//!
//! One [`FileEvent`] is delivered per changed entry, through an [`EventSink`]
//! supplied at watch registration. Within one poll of one directory the
//! category order is fixed (file creations, modifications, deletions, moves,
//! then the same four for directories); across directories the only guarantee
//! is that a parent's own changes are delivered before its children's.

use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc;

use tracing::debug;

use crate::types::WatchId;

/// What happened to a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Add,
    Modified,
    Delete,
    Moved,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Add => "add",
            Action::Modified => "modified",
            Action::Delete => "delete",
            Action::Moved => "moved",
        };
        f.pad(s)
    }
}

/// A single reported filesystem change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// Watch that produced the event.
    pub watch_id: WatchId,
    /// Directory containing the changed entry.
    pub dir: PathBuf,
    /// Bare name of the changed entry.
    pub name: String,
    pub action: Action,
    /// Previous bare name; set for [`Action::Moved`] only.
    pub old_name: Option<String>,
}

impl fmt::Display for FileEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.old_name {
            Some(old) => write!(
                f,
                "[{}] {:<8} {} {} (was {})",
                self.watch_id,
                self.action,
                self.dir.display(),
                self.name,
                old
            ),
            None => write!(
                f,
                "[{}] {:<8} {} {}",
                self.watch_id,
                self.action,
                self.dir.display(),
                self.name
            ),
        }
    }
}

/// Consumer of finished events.
///
/// Called synchronously from inside the poll pass; implementations should
/// hand the event off quickly rather than do real work inline.
pub trait EventSink: Send {
    fn handle_event(&self, event: FileEvent);
}

/// Sink that forwards every event into an `mpsc` channel.
///
/// The receiving side is owned by the caller; a closed receiver is logged and
/// otherwise ignored so a lagging consumer can never break the poll pass.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<FileEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<FileEvent>) -> Self {
        Self { tx }
    }

    /// Convenience constructor returning the sink and its receiver.
    pub fn pair() -> (Self, mpsc::Receiver<FileEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(tx), rx)
    }
}

impl EventSink for ChannelSink {
    fn handle_event(&self, event: FileEvent) {
        if self.tx.send(event).is_err() {
            debug!("event receiver dropped; discarding event");
        }
    }
}
