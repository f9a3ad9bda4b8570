use std::sync::{Arc, Mutex};

use pollwatch::events::{Action, EventSink, FileEvent};

/// A sink that records every event it receives.
///
/// Clones share the same buffer, so tests can keep one handle and give the
/// forest another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<FileEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, in delivery order.
    pub fn events(&self) -> Vec<FileEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Drain the recorded events, leaving the buffer empty.
    pub fn take(&self) -> Vec<FileEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }

    /// Names of recorded events with the given action, in delivery order.
    pub fn names_for(&self, action: Action) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.action == action)
            .map(|e| e.name.clone())
            .collect()
    }

    /// The recorded `Moved` events as `(old_name, new_name)` pairs.
    pub fn moves(&self) -> Vec<(String, String)> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.action == Action::Moved)
            .map(|e| {
                (
                    e.old_name.clone().unwrap_or_default(),
                    e.name.clone(),
                )
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn handle_event(&self, event: FileEvent) {
        self.events.lock().unwrap().push(event);
    }
}
