//! Performance snapshots and the rolling window they are evaluated over

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Outcome of one learning card: the learner chose "repeat" or "finish".
/// Append-only; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub item_id: String,
    pub repeated: bool,
    pub completed: bool,
    pub timestamp: DateTime<Utc>,
}

impl PerformanceSnapshot {
    pub fn repeat(item_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            item_id: item_id.into(),
            repeated: true,
            completed: false,
            timestamp,
        }
    }

    pub fn finish(item_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            item_id: item_id.into(),
            repeated: false,
            completed: true,
            timestamp,
        }
    }
}

/// Bounded rolling window; pushing past capacity drops the oldest snapshot
#[derive(Debug, Clone)]
pub struct SnapshotWindow {
    capacity: usize,
    snapshots: VecDeque<PerformanceSnapshot>,
}

impl SnapshotWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            snapshots: VecDeque::with_capacity(capacity),
        }
    }

    /// Window holding the most recent `capacity` snapshots of a log
    pub fn from_log(capacity: usize, log: &[PerformanceSnapshot]) -> Self {
        let mut window = Self::new(capacity);
        for snapshot in log {
            window.push(snapshot.clone());
        }
        window
    }

    pub fn push(&mut self, snapshot: PerformanceSnapshot) {
        if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshots oldest first
    pub fn to_vec(&self) -> Vec<PerformanceSnapshot> {
        self.snapshots.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_drops_oldest() {
        let now = Utc::now();
        let mut window = SnapshotWindow::new(2);
        window.push(PerformanceSnapshot::finish("a", now));
        window.push(PerformanceSnapshot::finish("b", now));
        window.push(PerformanceSnapshot::repeat("c", now));

        let ids: Vec<String> = window.to_vec().into_iter().map(|s| s.item_id).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(window.capacity(), 2);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut window = SnapshotWindow::new(0);
        window.push(PerformanceSnapshot::finish("a", Utc::now()));
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn test_constructors() {
        let now = Utc::now();
        let r = PerformanceSnapshot::repeat("x", now);
        assert!(r.repeated && !r.completed);
        let f = PerformanceSnapshot::finish("x", now);
        assert!(!f.repeated && f.completed);
    }
}
