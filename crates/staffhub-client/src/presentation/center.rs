//! Bounded, deduplicated notification history.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use staffhub_realtime::{MessageId, NotificationMessage};

use super::store::StoredNotification;

/// Default number of notifications kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// One notification in the history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEntry {
    pub message: NotificationMessage,
    pub read: bool,
    pub received_at: DateTime<Utc>,
}

/// Most-recent-first notification history with read flags.
///
/// Message id is the only dedup key; timestamps are never used for
/// ordering. Arrival order decides position.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    capacity: usize,
    entries: VecDeque<NotificationEntry>,
    connected: bool,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl NotificationCenter {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
            connected: false,
        }
    }

    /// Record a newly received message as unread at the front.
    ///
    /// Returns `false` when a message with the same id is already present.
    pub fn push(&mut self, message: NotificationMessage) -> bool {
        if self.contains(&message.id) {
            return false;
        }
        self.entries.push_front(NotificationEntry {
            message,
            read: false,
            received_at: Utc::now(),
        });
        self.entries.truncate(self.capacity);
        true
    }

    /// Append previously stored notifications behind the live ones.
    ///
    /// `stored` is expected newest first. Returns how many were added.
    pub fn seed(&mut self, stored: impl IntoIterator<Item = StoredNotification>) -> usize {
        let mut added = 0;
        for item in stored {
            if self.entries.len() >= self.capacity {
                break;
            }
            if self.contains(&item.message.id) {
                continue;
            }
            self.entries.push_back(NotificationEntry {
                received_at: item.message.timestamp,
                message: item.message,
                read: item.read,
            });
            added += 1;
        }
        added
    }

    /// Flag one entry as read. Returns `false` if it is unknown or already read.
    pub fn mark_as_read(&mut self, id: &MessageId) -> bool {
        match self.entries.iter_mut().find(|e| &e.message.id == id) {
            Some(entry) if !entry.read => {
                entry.read = true;
                true
            }
            _ => false,
        }
    }

    /// Flag every entry as read. Returns how many changed.
    pub fn mark_all_as_read(&mut self) -> usize {
        let mut changed = 0;
        for entry in self.entries.iter_mut().filter(|e| !e.read) {
            entry.read = true;
            changed += 1;
        }
        changed
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.read).count()
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.entries.iter().any(|e| &e.message.id == id)
    }

    pub fn get(&self, id: &MessageId) -> Option<&NotificationEntry> {
        self.entries.iter().find(|e| &e.message.id == id)
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &NotificationEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}
