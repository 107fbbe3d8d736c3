//! Bounded window of recently created entries
//!
//! Tag amendment needs the entry after creation, so the facade keeps the
//! most recent entries here. When the window is full the oldest entry is
//! evicted; a capacity of zero retains nothing.

use super::log_entry::LogEntry;
use std::collections::{HashMap, VecDeque};

pub const DEFAULT_RETENTION_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
struct Retained {
    entry: LogEntry,
    delivered: bool,
}

/// Outcome of a tag amendment
#[derive(Debug, Clone, PartialEq)]
pub enum TagOutcome {
    /// Tag added; carries a snapshot of the amended entry and whether the
    /// entry had been delivered to the backend
    Added { entry: LogEntry, delivered: bool },
    /// Tag was already present
    AlreadyPresent,
    /// Id unknown or evicted
    Unknown,
}

#[derive(Debug)]
pub struct RetentionWindow {
    capacity: usize,
    order: VecDeque<String>,
    entries: HashMap<String, Retained>,
    evicted: u64,
}

impl RetentionWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity.min(DEFAULT_RETENTION_CAPACITY)),
            entries: HashMap::with_capacity(capacity.min(DEFAULT_RETENTION_CAPACITY)),
            evicted: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries pushed out by newer ones
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn insert(&mut self, entry: LogEntry, delivered: bool) {
        if self.capacity == 0 {
            return;
        }

        while self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                self.evicted += 1;
            }
        }

        let id = entry.id().to_string();
        self.order.push_back(id.clone());
        self.entries.insert(id, Retained { entry, delivered });
    }

    pub fn get(&self, id: &str) -> Option<&LogEntry> {
        self.entries.get(id).map(|r| &r.entry)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn add_tag(&mut self, id: &str, tag: &str) -> TagOutcome {
        match self.entries.get_mut(id) {
            None => TagOutcome::Unknown,
            Some(retained) => {
                if retained.entry.add_tag(tag) {
                    TagOutcome::Added {
                        entry: retained.entry.clone(),
                        delivered: retained.delivered,
                    }
                } else {
                    TagOutcome::AlreadyPresent
                }
            }
        }
    }
}

impl Default for RetentionWindow {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION_CAPACITY)
    }
}
