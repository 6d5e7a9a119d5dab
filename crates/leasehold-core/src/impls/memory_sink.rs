//! MemoryLogSink - keeps entries in memory (tests, diagnostics).

use std::sync::{Arc, Mutex, MutexGuard};

use crate::ports::{LogEntry, LogLevel, LogSink};

/// Cloning shares the underlying buffer, so a clone handed to the processor
/// can be inspected from the test afterwards.
#[derive(Debug, Default, Clone)]
pub struct MemoryLogSink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    pub fn entries_at(&self, level: LogLevel) -> Vec<LogEntry> {
        self.lock()
            .iter()
            .filter(|entry| entry.level == level)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panicking test thread must not hide the entries from the others.
    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LogSink for MemoryLogSink {
    fn record(&self, entry: LogEntry) {
        self.lock().push(entry);
    }
}
