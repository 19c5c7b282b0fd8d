//! Session generator
//!
//! Picks the items for one learning session: the first module in the
//! profile's order that still has unmastered items, capped by the age band's
//! item count. Sessions never mix modules.

use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::curriculum::{Catalog, CurriculumItem};
use crate::profile::{resolve_rule_set, RuleSet};

/// Completions at which an item leaves active rotation
pub const DEFAULT_MASTERY_THRESHOLD: u32 = 3;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("catalog has no items to build a session from")]
    EmptyCatalog,
}

/// One generated batch of items
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub items: Vec<CurriculumItem>,
    pub target_duration_minutes: u32,
}

/// Receives every generated session
pub trait SessionObserver {
    fn on_session_generated(&mut self, items: &[CurriculumItem], target_duration_minutes: u32);
}

impl<F> SessionObserver for F
where
    F: FnMut(&[CurriculumItem], u32),
{
    fn on_session_generated(&mut self, items: &[CurriculumItem], target_duration_minutes: u32) {
        self(items, target_duration_minutes)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionGenerator {
    mastery_threshold: u32,
}

impl Default for SessionGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MASTERY_THRESHOLD)
    }
}

impl SessionGenerator {
    pub fn new(mastery_threshold: u32) -> Self {
        Self { mastery_threshold }
    }

    pub fn mastery_threshold(&self) -> u32 {
        self.mastery_threshold
    }

    /// Whether an item is still in rotation. Missing counters count as zero.
    pub fn is_unmastered(&self, item_id: &str, mastery: &HashMap<String, u32>) -> bool {
        mastery.get(item_id).copied().unwrap_or(0) < self.mastery_threshold
    }

    /// Build a session for an (effective) rule set
    pub fn generate(
        &self,
        rules: &RuleSet,
        age: u8,
        mastery: &HashMap<String, u32>,
        catalog: &Catalog,
    ) -> Result<Session, SessionError> {
        if catalog.is_empty() {
            warn!("Cannot generate a session from an empty catalog");
            return Err(SessionError::EmptyCatalog);
        }

        let item_count = rules.content_complexity.for_age(age).item_count.max(1);

        let mut items = Vec::new();
        for category in rules.modules() {
            items = catalog
                .by_category(category)
                .filter(|item| self.is_unmastered(&item.id, mastery))
                .take(item_count)
                .cloned()
                .collect();
            if !items.is_empty() {
                info!(
                    "Session module '{}': {} item(s) for age {}",
                    category,
                    items.len(),
                    age
                );
                break;
            }
            debug!("Module '{}' has nothing left to teach", category);
        }

        if items.is_empty() {
            info!("Every module mastered, falling back to catalog head");
            items = catalog.items().iter().take(item_count).cloned().collect();
        }

        Ok(Session {
            id: Uuid::new_v4(),
            items,
            target_duration_minutes: rules.session_limit_minutes,
        })
    }

    /// [`generate`](Self::generate) and notify an observer
    pub fn generate_and_notify(
        &self,
        rules: &RuleSet,
        age: u8,
        mastery: &HashMap<String, u32>,
        catalog: &Catalog,
        observer: &mut impl SessionObserver,
    ) -> Result<Session, SessionError> {
        let session = self.generate(rules, age, mastery, catalog)?;
        observer.on_session_generated(&session.items, session.target_duration_minutes);
        Ok(session)
    }
}

/// Generate a session for a profile key with the default threshold. Unknown
/// keys use the default profile.
pub fn generate_session(
    profile_key: &str,
    age: u8,
    mastery: &HashMap<String, u32>,
    catalog: &Catalog,
) -> Result<Session, SessionError> {
    SessionGenerator::default().generate(resolve_rule_set(profile_key), age, mastery, catalog)
}
