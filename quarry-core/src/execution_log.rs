use crate::Params;
use std::{collections::VecDeque, sync::Arc, time::Duration};

/// A statement executed successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub sql: Arc<str>,
    pub params: Params,
    pub duration: Duration,
}

/// Ring buffer of the most recent executions.
#[derive(Debug, Clone, Default)]
pub struct ExecutionLog {
    entries: VecDeque<LogEntry>,
    capacity: Option<usize>,
}

impl ExecutionLog {
    /// `None` keeps every entry, `Some(0)` disables the log.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.unwrap_or(64).min(1024)),
            capacity,
        }
    }
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
    pub fn push(&mut self, entry: LogEntry) {
        match self.capacity {
            Some(0) => return,
            Some(capacity) => {
                while self.entries.len() >= capacity {
                    self.entries.pop_front();
                }
            }
            None => {}
        }
        self.entries.push_back(entry);
    }
    pub fn entries(&self) -> &VecDeque<LogEntry> {
        &self.entries
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn clear(&mut self) {
        self.entries.clear();
    }
    /// Remove and return every entry, oldest first.
    pub fn take(&mut self) -> Vec<LogEntry> {
        self.entries.drain(..).collect()
    }
}
