//! Append-only event log

use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// An event together with its position in the log and the time it was emitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord<E> {
    /// Position in the log, starting at 0
    pub sequence: u64,
    /// When the event was emitted
    pub timestamp: Timestamp,
    /// The event itself
    pub event: E,
}

/// An ordered log of emitted events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog<E> {
    records: Vec<EventRecord<E>>,
}

impl<E> Default for EventLog<E> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<E: Clone> EventLog<E> {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn push(&mut self, timestamp: Timestamp, event: E) -> u64 {
        let sequence = self.records.len() as u64;
        self.records.push(EventRecord {
            sequence,
            timestamp,
            event,
        });
        sequence
    }

    /// All records, oldest first
    pub fn records(&self) -> &[EventRecord<E>] {
        &self.records
    }

    /// Records with a sequence number at or after `sequence`
    pub fn since(&self, sequence: u64) -> Vec<EventRecord<E>> {
        self.records
            .iter()
            .filter(|r| r.sequence >= sequence)
            .cloned()
            .collect()
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
