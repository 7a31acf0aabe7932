//! Bounded, append-only record of notable simulation occurrences.
//!
//! The log keeps at most `capacity` entries. Appending past the bound
//! evicts the oldest entry first. Readers get copies, oldest first.

use std::collections::VecDeque;

use chrono::Utc;
use eruxian_types::{EventType, LogEntry};
use tracing::debug;

/// FIFO-evicting event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl EventLog {
    /// Create an empty log holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry stamped with the current time, evicting the oldest
    /// entries if the log is full.
    pub fn push(
        &mut self,
        event_type: EventType,
        description: impl Into<String>,
        entities: Vec<String>,
    ) {
        let entry = LogEntry {
            timestamp: Utc::now(),
            event_type,
            description: description.into(),
            entities,
        };
        debug!(
            event_type = ?entry.event_type,
            description = %entry.description,
            "Event logged"
        );
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// The most recent `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<LogEntry> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// Iterate over every retained entry, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained entries.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn milestone(log: &mut EventLog, n: u64) {
        log.push(EventType::TickMilestone, format!("Reached tick {n}."), Vec::new());
    }

    #[test]
    fn new_log_is_empty() {
        let log = EventLog::new(200);
        assert!(log.is_empty());
        assert_eq!(log.capacity(), 200);
        assert!(log.recent(50).is_empty());
    }

    #[test]
    fn oldest_entry_evicted_on_overflow() {
        let mut log = EventLog::new(200);
        for n in 1..=201 {
            milestone(&mut log, n);
        }
        assert_eq!(log.len(), 200);
        let first = log.iter().next().map(|e| e.description.clone());
        assert_eq!(first.as_deref(), Some("Reached tick 2."));
    }

    #[test]
    fn recent_returns_newest_oldest_first() {
        let mut log = EventLog::new(10);
        for n in 1..=5 {
            milestone(&mut log, n);
        }
        let recent: Vec<String> = log.recent(2).into_iter().map(|e| e.description).collect();
        assert_eq!(recent, vec!["Reached tick 4.", "Reached tick 5."]);
        assert_eq!(log.recent(100).len(), 5);
        assert!(log.recent(0).is_empty());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut log = EventLog::new(0);
        milestone(&mut log, 1);
        milestone(&mut log, 2);
        assert_eq!(log.len(), 1);
    }
}
