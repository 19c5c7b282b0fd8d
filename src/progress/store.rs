//! Progress Store - per-learner persistence
//!
//! One pretty-printed JSON file per learner under ~/.local/share/learnpath/progress/
//! holding profile, age, mastery counters, the snapshot log and the
//! accumulated rule overrides.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::adaptation::{PerformanceSnapshot, SnapshotWindow};
use crate::profile::{Profile, RuleOverrides, RuleSet};

/// Oldest snapshots are dropped past this many
pub const MAX_SNAPSHOT_LOG: usize = 500;

/// Everything remembered about one learner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerProgress {
    pub learner: String,
    pub profile: String,
    pub age: u8,
    #[serde(default)]
    pub mastery: HashMap<String, u32>,
    #[serde(default)]
    pub snapshots: Vec<PerformanceSnapshot>,
    #[serde(default)]
    pub overrides: RuleOverrides,
    pub updated_at: DateTime<Utc>,
}

impl LearnerProgress {
    pub fn new(learner: impl Into<String>, profile_key: impl Into<String>, age: u8) -> Self {
        Self {
            learner: learner.into(),
            profile: profile_key.into(),
            age,
            mastery: HashMap::new(),
            snapshots: Vec::new(),
            overrides: RuleOverrides::default(),
            updated_at: Utc::now(),
        }
    }

    pub fn profile(&self) -> Profile {
        Profile::resolve(&self.profile)
    }

    pub fn mastery_of(&self, item_id: &str) -> u32 {
        self.mastery.get(item_id).copied().unwrap_or(0)
    }

    /// Append a card outcome. Completions count toward mastery.
    pub fn record_snapshot(&mut self, snapshot: PerformanceSnapshot) {
        if snapshot.completed {
            let count = self.mastery.entry(snapshot.item_id.clone()).or_insert(0);
            *count = count.saturating_add(1);
            debug!("Mastery of '{}' is now {}", snapshot.item_id, count);
        }
        self.snapshots.push(snapshot);
        if self.snapshots.len() > MAX_SNAPSHOT_LOG {
            let excess = self.snapshots.len() - MAX_SNAPSHOT_LOG;
            self.snapshots.drain(..excess);
        }
        self.updated_at = Utc::now();
    }

    /// The most recent `capacity` snapshots
    pub fn recent_window(&self, capacity: usize) -> SnapshotWindow {
        SnapshotWindow::from_log(capacity, &self.snapshots)
    }

    /// Fold newly proposed overrides into the stored patch
    pub fn merge_overrides(&mut self, newer: &RuleOverrides) {
        if newer.is_empty() {
            return;
        }
        self.overrides.merge(newer);
        self.updated_at = Utc::now();
    }

    /// Base rules for the learner's profile with stored overrides applied
    pub fn effective_rules(&self) -> RuleSet {
        self.profile().rule_set().with_overrides(&self.overrides)
    }
}

/// Persistent progress store backed by JSON files
pub struct ProgressStore {
    base_dir: PathBuf,
}

impl ProgressStore {
    /// Create a store at the default location
    pub fn new() -> Result<Self> {
        let base_dir = crate::config::data_dir()?.join("progress");
        Self::with_dir(base_dir)
    }

    /// Create with a custom base directory
    pub fn with_dir(base_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&base_dir).context("Failed to create progress directory")?;
        Ok(Self { base_dir })
    }

    fn path_for(&self, learner: &str) -> PathBuf {
        let file: String = learner
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let file = if file.is_empty() { "default".to_string() } else { file };
        self.base_dir.join(format!("{}.json", file))
    }

    pub fn exists(&self, learner: &str) -> bool {
        self.path_for(learner).exists()
    }

    /// Load a learner, if one has been saved
    pub fn load(&self, learner: &str) -> Result<Option<LearnerProgress>> {
        let path = self.path_for(learner);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read progress file {}", path.display()))?;
        let progress = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse progress file {}", path.display()))?;
        Ok(Some(progress))
    }

    /// Load a learner or start fresh with the given profile and age
    pub fn load_or_create(&self, learner: &str, profile_key: &str, age: u8) -> Result<LearnerProgress> {
        match self.load(learner)? {
            Some(progress) => Ok(progress),
            None => {
                info!("New learner '{}' ({}, age {})", learner, profile_key, age);
                Ok(LearnerProgress::new(learner, profile_key, age))
            }
        }
    }

    pub fn save(&self, progress: &LearnerProgress) -> Result<()> {
        let path = self.path_for(&progress.learner);
        let content = serde_json::to_string_pretty(progress).context("Failed to serialize progress")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write progress file {}", path.display()))?;
        debug!("Saved progress for '{}' to {}", progress.learner, path.display());
        Ok(())
    }

    /// Names of every saved learner, sorted
    pub fn learners(&self) -> Result<Vec<String>> {
        let mut learners = Vec::new();
        let entries = std::fs::read_dir(&self.base_dir).context("Failed to read progress directory")?;
        for entry in entries {
            let path = entry.context("Failed to read progress entry")?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read progress file {}", path.display()))?;
            if let Ok(progress) = serde_json::from_str::<LearnerProgress>(&content) {
                learners.push(progress.learner);
            }
        }
        learners.sort();
        Ok(learners)
    }
}
