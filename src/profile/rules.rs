//! Profile rule table
//!
//! A [`RuleSet`] controls presentation priorities, module ordering, session
//! limits and content complexity for one profile. The base table is static;
//! adaptation produces [`RuleOverrides`] that are layered on top of it.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::Profile;
use crate::curriculum::Category;
use crate::types::AgeBand;

/// How a profile prefers to move between steps. Hosts may read it to
/// decide whether to show a "next" affordance; the player's exit rule is
/// driven by each step's own duration and tap flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdvanceMode {
    Auto,
    Tap,
    Both,
}

/// How mistakes are handled in interactive tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorHandling {
    Errorless,
    GentleRedirect,
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationIntensity {
    Low,
    Medium,
    High,
}

/// Items per session and steps per task for one age band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complexity {
    pub item_count: usize,
    pub steps_per_task: usize,
}

impl Complexity {
    pub const fn new(item_count: usize, steps_per_task: usize) -> Self {
        Self {
            item_count,
            steps_per_task,
        }
    }
}

/// Content complexity keyed by age band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentComplexity {
    #[serde(rename = "3-5")]
    pub preschool: Complexity,
    #[serde(rename = "6-8")]
    pub early_primary: Complexity,
    #[serde(rename = "9-12")]
    pub late_primary: Complexity,
}

impl ContentComplexity {
    pub fn for_band(&self, band: AgeBand) -> Complexity {
        match band {
            AgeBand::Preschool => self.preschool,
            AgeBand::EarlyPrimary => self.early_primary,
            AgeBand::LatePrimary => self.late_primary,
        }
    }

    pub fn for_age(&self, age: u8) -> Complexity {
        self.for_band(AgeBand::for_age(age))
    }
}

/// Per-profile presentation rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Weight of visual presentation, 0.0-1.0
    pub visual_priority: f32,
    /// Weight of auditory presentation, 0.0-1.0. Independent of the visual
    /// weight; the two need not sum to 1.
    pub auditory_priority: f32,
    /// Whole-before-parts instruction
    pub gestalt_instruction: bool,
    /// Category keys in pedagogical priority order. Keys that name no
    /// category are skipped by the session generator.
    pub module_order: Vec<String>,
    pub session_limit_minutes: u32,
    pub advance_mode: AdvanceMode,
    pub error_handling: ErrorHandling,
    pub animation_intensity: AnimationIntensity,
    pub content_complexity: ContentComplexity,
}

/// Auditory weight at or above which feedback uses stronger audio cues
pub const AUDITORY_REINFORCEMENT_THRESHOLD: f32 = 0.7;

impl RuleSet {
    /// Whether feedback steps should use the stronger narration and audio cues
    pub fn favors_auditory_reinforcement(&self) -> bool {
        self.auditory_priority >= AUDITORY_REINFORCEMENT_THRESHOLD
    }

    /// Parsed module order, skipping keys that name no category
    pub fn modules(&self) -> impl Iterator<Item = Category> + '_ {
        self.module_order.iter().filter_map(|key| Category::parse(key))
    }

    /// Effective rule set with a sparse patch applied. The base is untouched.
    pub fn with_overrides(&self, overrides: &RuleOverrides) -> RuleSet {
        let mut rules = self.clone();
        if let Some(v) = overrides.visual_priority {
            rules.visual_priority = v.clamp(0.0, 1.0);
        }
        if let Some(v) = overrides.auditory_priority {
            rules.auditory_priority = v.clamp(0.0, 1.0);
        }
        if let Some(v) = overrides.session_limit_minutes {
            rules.session_limit_minutes = v;
        }
        if let Some(v) = overrides.advance_mode {
            rules.advance_mode = v;
        }
        if let Some(v) = overrides.error_handling {
            rules.error_handling = v;
        }
        if let Some(v) = overrides.animation_intensity {
            rules.animation_intensity = v;
        }
        rules
    }
}

/// Sparse patch over a [`RuleSet`]; unset fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_priority: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auditory_priority: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_limit_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advance_mode: Option<AdvanceMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_handling: Option<ErrorHandling>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_intensity: Option<AnimationIntensity>,
}

impl RuleOverrides {
    pub fn is_empty(&self) -> bool {
        *self == RuleOverrides::default()
    }

    /// Fold a newer patch over this one, field by field
    pub fn merge(&mut self, newer: &RuleOverrides) {
        self.visual_priority = newer.visual_priority.or(self.visual_priority);
        self.auditory_priority = newer.auditory_priority.or(self.auditory_priority);
        self.session_limit_minutes = newer.session_limit_minutes.or(self.session_limit_minutes);
        self.advance_mode = newer.advance_mode.or(self.advance_mode);
        self.error_handling = newer.error_handling.or(self.error_handling);
        self.animation_intensity = newer.animation_intensity.or(self.animation_intensity);
    }
}

struct RuleTable {
    autism: RuleSet,
    adhd: RuleSet,
    down_syndrome: RuleSet,
    williams: RuleSet,
    dyslexia: RuleSet,
    other: RuleSet,
}

static TABLE: Lazy<RuleTable> = Lazy::new(|| RuleTable {
    // Predictable, low-stimulation, life skills before letters
    autism: RuleSet {
        visual_priority: 0.9,
        auditory_priority: 0.3,
        gestalt_instruction: false,
        module_order: modules(&["emotions", "body-parts", "colors", "shapes", "letters", "numbers", "animals"]),
        session_limit_minutes: 10,
        advance_mode: AdvanceMode::Tap,
        error_handling: ErrorHandling::Errorless,
        animation_intensity: AnimationIntensity::Low,
        content_complexity: ContentComplexity {
            preschool: Complexity::new(4, 2),
            early_primary: Complexity::new(6, 3),
            late_primary: Complexity::new(8, 4),
        },
    },
    adhd: RuleSet {
        visual_priority: 0.7,
        auditory_priority: 0.6,
        gestalt_instruction: false,
        module_order: modules(&["animals", "vehicles", "colors", "numbers", "letters", "shapes"]),
        session_limit_minutes: 8,
        advance_mode: AdvanceMode::Auto,
        error_handling: ErrorHandling::GentleRedirect,
        animation_intensity: AnimationIntensity::High,
        content_complexity: ContentComplexity {
            preschool: Complexity::new(3, 2),
            early_primary: Complexity::new(5, 3),
            late_primary: Complexity::new(6, 3),
        },
    },
    // Strong visual memory, songs before letters, whole-word first
    down_syndrome: RuleSet {
        visual_priority: 0.8,
        auditory_priority: 0.5,
        gestalt_instruction: true,
        module_order: modules(&["songs", "animals", "letters", "colors", "fruits", "numbers", "body-parts"]),
        session_limit_minutes: 15,
        advance_mode: AdvanceMode::Both,
        error_handling: ErrorHandling::Errorless,
        animation_intensity: AnimationIntensity::Medium,
        content_complexity: ContentComplexity {
            preschool: Complexity::new(8, 2),
            early_primary: Complexity::new(10, 3),
            late_primary: Complexity::new(12, 4),
        },
    },
    // Strong auditory and social engagement
    williams: RuleSet {
        visual_priority: 0.4,
        auditory_priority: 0.9,
        gestalt_instruction: true,
        module_order: modules(&["songs", "emotions", "animals", "letters", "numbers", "vehicles"]),
        session_limit_minutes: 20,
        advance_mode: AdvanceMode::Auto,
        error_handling: ErrorHandling::GentleRedirect,
        animation_intensity: AnimationIntensity::High,
        content_complexity: ContentComplexity {
            preschool: Complexity::new(6, 3),
            early_primary: Complexity::new(8, 4),
            late_primary: Complexity::new(10, 5),
        },
    },
    dyslexia: RuleSet {
        visual_priority: 0.8,
        auditory_priority: 0.8,
        gestalt_instruction: false,
        module_order: modules(&["letters", "shapes", "numbers", "colors"]),
        session_limit_minutes: 15,
        advance_mode: AdvanceMode::Tap,
        error_handling: ErrorHandling::GentleRedirect,
        animation_intensity: AnimationIntensity::Medium,
        content_complexity: ContentComplexity {
            preschool: Complexity::new(4, 2),
            early_primary: Complexity::new(6, 3),
            late_primary: Complexity::new(8, 4),
        },
    },
    other: RuleSet {
        visual_priority: 0.5,
        auditory_priority: 0.5,
        gestalt_instruction: false,
        module_order: modules(&[
            "letters", "numbers", "colors", "animals", "fruits", "shapes", "vehicles", "body-parts",
            "emotions", "songs",
        ]),
        session_limit_minutes: 15,
        advance_mode: AdvanceMode::Both,
        error_handling: ErrorHandling::Standard,
        animation_intensity: AnimationIntensity::Medium,
        content_complexity: ContentComplexity {
            preschool: Complexity::new(5, 3),
            early_primary: Complexity::new(8, 4),
            late_primary: Complexity::new(10, 5),
        },
    },
});

fn modules(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

pub(super) fn table(profile: Profile) -> &'static RuleSet {
    match profile {
        Profile::Autism => &TABLE.autism,
        Profile::Adhd => &TABLE.adhd,
        Profile::DownSyndrome => &TABLE.down_syndrome,
        Profile::Williams => &TABLE.williams,
        Profile::Dyslexia => &TABLE.dyslexia,
        Profile::Other => &TABLE.other,
    }
}
