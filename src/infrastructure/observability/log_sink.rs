use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::{LogEntry, LogLevel};

pub const DEFAULT_SINK_CAPACITY: usize = 1000;

/// Bounded in-memory log buffer, newest entry first.
///
/// Clones share the same buffer.
#[derive(Clone)]
pub struct LogSink {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl LogSink {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Formats `args` into one message: strings as-is, anything else as
    /// pretty-printed JSON, separated by single spaces.
    pub fn record(&self, level: LogLevel, source: &str, args: &[Value]) -> LogEntry {
        let entry = LogEntry::new(level, format_args_message(args), source.to_string());
        self.push(entry.clone());
        entry
    }

    pub fn push(&self, entry: LogEntry) {
        let mut entries = self.lock();
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }

    /// Entries strictly newer than `since`, or all of them.
    pub fn query(&self, since: Option<DateTime<Utc>>) -> Vec<LogEntry> {
        let entries = self.lock();
        match since {
            Some(since) => entries
                .iter()
                .filter(|entry| entry.timestamp > since)
                .cloned()
                .collect(),
            None => entries.iter().cloned().collect(),
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock leaves the deque structurally valid.
    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(DEFAULT_SINK_CAPACITY)
    }
}

fn format_args_message(args: &[Value]) -> String {
    args.iter()
        .map(|arg| match arg {
            Value::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
