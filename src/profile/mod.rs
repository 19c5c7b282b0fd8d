//! Learner profiles
//!
//! A profile is the diagnosed cognitive/sensory learner category. Every
//! per-profile behavior (rule set, step sequence, social phrasing) hangs off
//! the [`Profile`] variant, so adding a profile means adding table rows,
//! never touching the player.
//!
//! Lookups never fail: unknown keys resolve to [`Profile::Other`].

pub mod rules;
pub mod sequences;
pub mod phrases;

pub use rules::{
    AdvanceMode, AnimationIntensity, Complexity, ContentComplexity, ErrorHandling, RuleOverrides,
    RuleSet,
};
pub use sequences::{Phase, Sequence, Step, StepKind};
pub use phrases::SocialStyle;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Known learner profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    Autism,
    Adhd,
    DownSyndrome,
    Williams,
    Dyslexia,
    Other,
}

impl Profile {
    pub fn all() -> &'static [Profile] {
        &[
            Profile::Autism,
            Profile::Adhd,
            Profile::DownSyndrome,
            Profile::Williams,
            Profile::Dyslexia,
            Profile::Other,
        ]
    }

    /// Canonical kebab-case key
    pub fn key(&self) -> &'static str {
        match self {
            Profile::Autism => "autism",
            Profile::Adhd => "adhd",
            Profile::DownSyndrome => "down-syndrome",
            Profile::Williams => "williams",
            Profile::Dyslexia => "dyslexia",
            Profile::Other => "other",
        }
    }

    /// Resolve a free-form key. Case and separators are folded
    /// (`Down_Syndrome`, `down syndrome` and `down-syndrome` are equal);
    /// unrecognized keys fall back to `Other`.
    pub fn resolve(key: &str) -> Self {
        let normalized = normalize_key(key);
        let profile = match normalized.as_str() {
            "autism" | "asd" | "autistic" => Profile::Autism,
            "adhd" | "add" => Profile::Adhd,
            "down-syndrome" | "down" | "ds" | "trisomy-21" => Profile::DownSyndrome,
            "williams" | "williams-syndrome" => Profile::Williams,
            "dyslexia" => Profile::Dyslexia,
            _ => Profile::Other,
        };

        if profile == Profile::Other && normalized != "other" {
            debug!("Unknown profile key '{}', using default profile", key);
        }
        profile
    }

    pub fn rule_set(&self) -> &'static RuleSet {
        rules::table(*self)
    }

    pub fn sequence(&self) -> &'static Sequence {
        sequences::library(*self)
    }

    pub fn social_style(&self) -> Option<SocialStyle> {
        phrases::social_style(*self)
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Fold case and separators: lowercase, `_`/space become `-`, runs of `-`
/// collapse, leading/trailing `-` are dropped.
pub fn normalize_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .replace(['_', ' '], "-")
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Rule set for a profile key, falling back to the default profile
pub fn resolve_rule_set(key: &str) -> &'static RuleSet {
    Profile::resolve(key).rule_set()
}

/// Sequence for a profile key, falling back to the default profile
pub fn resolve_sequence(key: &str) -> &'static Sequence {
    Profile::resolve(key).sequence()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Down_Syndrome"), "down-syndrome");
        assert_eq!(normalize_key("  down  syndrome "), "down-syndrome");
        assert_eq!(normalize_key("--ADHD--"), "adhd");
    }

    #[test]
    fn test_resolve_known_keys() {
        assert_eq!(Profile::resolve("autism"), Profile::Autism);
        assert_eq!(Profile::resolve("DOWN_SYNDROME"), Profile::DownSyndrome);
        assert_eq!(Profile::resolve("down-syndrome"), Profile::DownSyndrome);
        assert_eq!(Profile::resolve("Williams"), Profile::Williams);
    }

    #[test]
    fn test_unknown_keys_fall_back_to_other() {
        for key in ["", "   ", "martian", "autism-but-not-really", "🦄"] {
            assert_eq!(Profile::resolve(key), Profile::Other, "key {:?}", key);
            // Both lookups must produce a value
            let rules = resolve_rule_set(key);
            let sequence = resolve_sequence(key);
            assert_eq!(rules, Profile::Other.rule_set());
            assert_eq!(sequence, Profile::Other.sequence());
        }
    }

    #[test]
    fn test_canonical_keys_round_trip() {
        for profile in Profile::all() {
            assert_eq!(Profile::resolve(profile.key()), *profile);
        }
    }
}
