//! Host-side learner progress

pub mod store;

pub use store::{LearnerProgress, ProgressStore, MAX_SNAPSHOT_LOG};
