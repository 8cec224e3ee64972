use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Debug view of one timeline, refreshed whenever the timeline changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineSnapshot {
    pub name: String,
    /// Ordered queue, head first.
    pub queue: Vec<String>,
    /// Background actions, insertion order.
    pub background: Vec<String>,
}

/// Live timelines, for debug overlays and logs.
///
/// Holds weak references only: a timeline disappears from the registry as soon as it is
/// dropped or destroyed.
#[derive(Clone, Default)]
pub struct TimelineRegistry {
    entries: Arc<Mutex<Vec<Weak<Mutex<TimelineSnapshot>>>>>,
}

impl TimelineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn track(&self, snapshot: &Arc<Mutex<TimelineSnapshot>>) {
        let mut entries = self.entries.lock();
        entries.retain(|w| w.strong_count() > 0);
        entries.push(Arc::downgrade(snapshot));
    }

    pub fn snapshots(&self) -> Vec<TimelineSnapshot> {
        let mut entries = self.entries.lock();
        entries.retain(|w| w.strong_count() > 0);
        entries
            .iter()
            .filter_map(|w| w.upgrade())
            .map(|s| s.lock().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One line per live timeline, e.g. `level: [walk, delay] bg [music]`.
    pub fn describe(&self) -> Vec<String> {
        self.snapshots()
            .into_iter()
            .map(|s| {
                let queue = s.queue.join(", ");
                let background = s.background.join(", ");
                format!("{}: [{queue}] bg [{background}]", s.name)
            })
            .collect()
    }
}
