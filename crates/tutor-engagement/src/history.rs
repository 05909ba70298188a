//! Bounded rolling history of face-derived engagement states.

use std::collections::VecDeque;

use chrono::Utc;

use tutor_core::types::{EngagementLabel, EngagementRecord};

/// Default number of records retained.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Sliding window over the most recent engagement records.
///
/// Once the window is full, recording a new entry evicts the oldest one.
#[derive(Debug, Clone)]
pub struct EngagementHistory {
    records: VecDeque<EngagementRecord>,
    capacity: usize,
}

impl Default for EngagementHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl EngagementHistory {
    /// Create an empty history holding at most `capacity` records.
    ///
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record stamped with the current time.
    pub fn record(&mut self, label: EngagementLabel) {
        self.push(EngagementRecord {
            label,
            timestamp: Utc::now(),
        });
    }

    /// Append an already-stamped record.
    pub fn push(&mut self, record: EngagementRecord) {
        self.records.push_back(record);
        while self.records.len() > self.capacity {
            self.records.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent record, if any.
    pub fn latest(&self) -> Option<&EngagementRecord> {
        self.records.back()
    }

    /// Records oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &EngagementRecord> {
        self.records.iter()
    }

    /// Owned copy of the records, oldest-first.
    pub fn snapshot(&self) -> Vec<EngagementRecord> {
        self.records.iter().cloned().collect()
    }
}
