//! learnpath - Adaptive Instructional Sequencing Library
//!
//! Presents the same curriculum item through a different sequence of steps
//! depending on the child's learning profile:
//! - Profile rule table and per-profile step sequences
//! - Timed sequence player with tap suspension and stale-timer guards
//! - Session generator bounded by module order and age band
//! - Adaptation evaluator that nudges rules from recent performance
//!
//! # Example
//!
//! ```ignore
//! use learnpath::curriculum::Catalog;
//! use learnpath::player::{SequencePlayer, VirtualHost};
//! use learnpath::profile::Profile;
//!
//! let item = Catalog::builtin().get("animal-dog").unwrap().clone();
//! let mut player = SequencePlayer::new(VirtualHost::new(), Profile::Autism, item);
//! player.start();
//! player.run_to_end(64);
//! let snapshot = player.finish();
//! ```

// Core modules (order matters for cross-module dependencies)
pub mod types;
pub mod config;
pub mod curriculum;
pub mod profile;
pub mod adaptation;
pub mod player;
pub mod session;
pub mod progress;
pub mod cli;

// Re-export commonly used types for convenience
pub use types::{AgeBand, Locale, LocalizedText};

pub use config::Config;

pub use curriculum::{Catalog, CatalogError, Category, CurriculumItem};

pub use profile::{
    resolve_rule_set,
    resolve_sequence,
    Phase,
    Profile,
    RuleOverrides,
    RuleSet,
    Sequence,
    Step,
    StepKind,
};

pub use player::{
    PlayerState,
    PlayerStatus,
    PresentationHost,
    SequencePlayer,
    VirtualHost,
};

pub use session::{generate_session, Session, SessionError, SessionGenerator};

pub use adaptation::{evaluate, PerformanceSnapshot, SnapshotWindow};

pub use progress::{LearnerProgress, ProgressStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get the library info
pub fn info() -> String {
    format!("{} v{} - Adaptive Instructional Sequencing", NAME, VERSION)
}
