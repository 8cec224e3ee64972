use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub level: log::Level,
    pub target: String,
    pub message: String,
}

struct Ring {
    lines: VecDeque<ConsoleLine>,
    capacity: usize,
}

/// Bounded in-memory log history, readable by debug overlays.
///
/// Cloneable handle; the logging backend pushes into it, the engine and tools read it.
#[derive(Clone)]
pub struct ConsoleBuffer {
    inner: Arc<Mutex<Ring>>,
}

impl ConsoleBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(Ring {
                lines: VecDeque::with_capacity(capacity),
                capacity,
            })),
        }
    }

    pub fn push(&self, line: ConsoleLine) {
        let mut ring = self.inner.lock();
        if ring.lines.len() == ring.capacity {
            ring.lines.pop_front();
        }
        ring.lines.push_back(line);
    }

    pub fn print(&self, level: log::Level, target: &str, message: impl Into<String>) {
        self.push(ConsoleLine {
            level,
            target: target.to_string(),
            message: message.into(),
        });
    }

    /// Oldest first.
    pub fn lines(&self) -> Vec<ConsoleLine> {
        self.inner.lock().lines.iter().cloned().collect()
    }

    pub fn tail(&self, n: usize) -> Vec<ConsoleLine> {
        let ring = self.inner.lock();
        let skip = ring.lines.len().saturating_sub(n);
        ring.lines.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }

    pub fn clear(&self) {
        self.inner.lock().lines.clear();
    }
}

impl Default for ConsoleBuffer {
    fn default() -> Self {
        Self::new(256)
    }
}
