//! Adaptation feedback loop
//!
//! Performance snapshots accumulate per learning card; the evaluator
//! periodically turns a rolling window of them into rule-set overrides that
//! feed the next session and the next card.

pub mod snapshot;
pub mod evaluator;

pub use snapshot::{PerformanceSnapshot, SnapshotWindow};
pub use evaluator::{evaluate, AdaptationThresholds, WindowMetrics};
