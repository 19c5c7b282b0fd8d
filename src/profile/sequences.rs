//! Sequence library
//!
//! Each profile teaches an item through three phases of steps: intro,
//! learning and feedback. Any phase may be empty.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::Profile;

/// Presentation step kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    Visual,
    Audio,
    VisualAudio,
    Context,
    Song,
    Social,
    Interaction,
    Feedback,
    LetterName,
    LetterSound,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepKind::Visual => "visual",
            StepKind::Audio => "audio",
            StepKind::VisualAudio => "visual-audio",
            StepKind::Context => "context",
            StepKind::Song => "song",
            StepKind::Social => "social",
            StepKind::Interaction => "interaction",
            StepKind::Feedback => "feedback",
            StepKind::LetterName => "letter-name",
            StepKind::LetterSound => "letter-sound",
        };
        write!(f, "{}", s)
    }
}

/// One atomic presentation unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub kind: StepKind,
    /// Milliseconds; 0 means advance immediately unless waiting for a tap
    pub duration_ms: u64,
    /// Suppress narration
    #[serde(default)]
    pub silent: bool,
    /// Marks a step authored to flow on by itself. Descriptive only: any
    /// step with a positive duration advances when it elapses.
    #[serde(default)]
    pub auto_advance: bool,
    /// Suspend until the host delivers a tap. Takes precedence over
    /// `auto_advance`.
    #[serde(default)]
    pub wait_for_tap: bool,
    /// Start obscured and clear shortly before the end (context steps only)
    #[serde(default)]
    pub blur: bool,
    /// Tone hint for narration and sound selection
    #[serde(default)]
    pub enthusiastic: bool,
}

impl Step {
    pub fn new(kind: StepKind, duration_ms: u64) -> Self {
        Self {
            kind,
            duration_ms,
            silent: false,
            auto_advance: false,
            wait_for_tap: false,
            blur: false,
            enthusiastic: false,
        }
    }

    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    pub fn auto(mut self) -> Self {
        self.auto_advance = true;
        self
    }

    pub fn wait_for_tap(mut self) -> Self {
        self.wait_for_tap = true;
        self
    }

    pub fn blurred(mut self) -> Self {
        self.blur = true;
        self
    }

    pub fn enthusiastic(mut self) -> Self {
        self.enthusiastic = true;
        self
    }
}

/// Sequence phases, in playing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Intro,
    Learning,
    Feedback,
}

impl Phase {
    pub fn all() -> &'static [Phase] {
        &[Phase::Intro, Phase::Learning, Phase::Feedback]
    }

    /// The phase after this one, `None` after feedback
    pub fn next(&self) -> Option<Phase> {
        match self {
            Phase::Intro => Some(Phase::Learning),
            Phase::Learning => Some(Phase::Feedback),
            Phase::Feedback => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Intro => write!(f, "intro"),
            Phase::Learning => write!(f, "learning"),
            Phase::Feedback => write!(f, "feedback"),
        }
    }
}

/// Phase-structured list of steps for one profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    #[serde(default)]
    pub intro: Vec<Step>,
    #[serde(default)]
    pub learning: Vec<Step>,
    #[serde(default)]
    pub feedback: Vec<Step>,
}

impl Sequence {
    pub fn steps(&self, phase: Phase) -> &[Step] {
        match phase {
            Phase::Intro => &self.intro,
            Phase::Learning => &self.learning,
            Phase::Feedback => &self.feedback,
        }
    }

    pub fn step(&self, phase: Phase, index: usize) -> Option<&Step> {
        self.steps(phase).get(index)
    }

    pub fn total_steps(&self) -> usize {
        self.intro.len() + self.learning.len() + self.feedback.len()
    }
}

struct SequenceLibrary {
    autism: Sequence,
    adhd: Sequence,
    down_syndrome: Sequence,
    williams: Sequence,
    dyslexia: Sequence,
    other: Sequence,
}

use StepKind::*;

static LIBRARY: Lazy<SequenceLibrary> = Lazy::new(|| SequenceLibrary {
    // Quiet look first, then name/sound; a deliberate pause before praise
    autism: Sequence {
        intro: vec![
            Step::new(Visual, 2500).silent().auto(),
            Step::new(VisualAudio, 3000).auto(),
        ],
        learning: vec![
            Step::new(LetterName, 2500).auto(),
            Step::new(LetterSound, 2500).auto(),
            Step::new(Context, 3000).blurred().auto(),
            Step::new(Interaction, 0),
        ],
        feedback: vec![Step::new(Feedback, 2000).auto()],
    },
    // Short and brisk; straight into learning
    adhd: Sequence {
        intro: vec![],
        learning: vec![
            Step::new(VisualAudio, 2000).auto(),
            Step::new(Audio, 1500).enthusiastic().auto(),
            Step::new(Context, 2000).blurred().auto(),
            Step::new(Interaction, 0),
        ],
        feedback: vec![Step::new(Feedback, 1500).enthusiastic().auto()],
    },
    down_syndrome: Sequence {
        intro: vec![Step::new(Song, 4000).enthusiastic().auto()],
        learning: vec![
            Step::new(VisualAudio, 3000).auto(),
            Step::new(Context, 3500).blurred().auto(),
            Step::new(Audio, 3000).enthusiastic().auto(),
            Step::new(Interaction, 0),
        ],
        feedback: vec![
            Step::new(Feedback, 2500).enthusiastic().auto(),
            Step::new(Social, 2000).auto(),
        ],
    },
    williams: Sequence {
        intro: vec![
            Step::new(Social, 2500).auto(),
            Step::new(Song, 3500).enthusiastic().auto(),
        ],
        learning: vec![
            Step::new(Audio, 3000).enthusiastic().auto(),
            Step::new(VisualAudio, 3000).auto(),
            Step::new(Context, 3000).blurred().auto(),
            Step::new(LetterSound, 2000).auto(),
        ],
        feedback: vec![
            Step::new(Feedback, 2500).enthusiastic().auto(),
            Step::new(Social, 2500).auto(),
        ],
    },
    // Letter work is tap-paced
    dyslexia: Sequence {
        intro: vec![Step::new(Visual, 2000).auto()],
        learning: vec![
            Step::new(LetterName, 3000).wait_for_tap(),
            Step::new(LetterSound, 3000).auto(),
            Step::new(VisualAudio, 2500).auto(),
            Step::new(Context, 3000).blurred().auto(),
        ],
        feedback: vec![Step::new(Feedback, 2000).auto()],
    },
    other: Sequence {
        intro: vec![Step::new(VisualAudio, 2500).auto()],
        learning: vec![
            Step::new(Visual, 2000).auto(),
            Step::new(Audio, 2500).auto(),
            Step::new(Context, 3000).blurred().auto(),
            Step::new(Social, 1500).auto(),
            Step::new(Interaction, 0),
        ],
        feedback: vec![Step::new(Feedback, 2000).auto()],
    },
});

pub(super) fn library(profile: Profile) -> &'static Sequence {
    match profile {
        Profile::Autism => &LIBRARY.autism,
        Profile::Adhd => &LIBRARY.adhd,
        Profile::DownSyndrome => &LIBRARY.down_syndrome,
        Profile::Williams => &LIBRARY.williams,
        Profile::Dyslexia => &LIBRARY.dyslexia,
        Profile::Other => &LIBRARY.other,
    }
}
