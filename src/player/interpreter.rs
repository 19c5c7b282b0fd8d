//! Pure step interpreter
//!
//! Turns a step plus the active item/profile into a plan: what to present
//! now, what to present later, and how the step is left. No side effects.

use std::time::Duration;

use super::host::Visual;
use crate::config::PlayerConfig;
use crate::curriculum::CurriculumItem;
use crate::profile::{phrases, Profile, RuleSet, Step, StepKind};
use crate::types::Locale;

/// Sound played by song steps
pub const WELCOME_EFFECT: &str = "welcome";
/// Sound played by every feedback step
pub const SUCCESS_EFFECT: &str = "success";
/// Extra sound for auditory-reinforcement profiles
pub const CELEBRATION_EFFECT: &str = "celebration";

/// A single presentation effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cue {
    Show(Visual),
    Narrate(String),
    Effect(String),
}

/// How the player leaves a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepExit {
    /// Advance synchronously
    Immediate,
    /// Advance when the timer fires
    After(Duration),
    /// Suspend until tapped
    WaitForTap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPlan {
    /// Performed on entering the step
    pub cues: Vec<Cue>,
    /// Performed after a delay, unless the step is left first
    pub delayed: Vec<(Duration, Cue)>,
    pub exit: StepExit,
}

impl StepPlan {
    /// Zero-delay skip with no presentation
    pub fn skip() -> Self {
        Self {
            cues: Vec::new(),
            delayed: Vec::new(),
            exit: StepExit::Immediate,
        }
    }

    pub fn is_skip(&self) -> bool {
        self.cues.is_empty() && self.delayed.is_empty() && self.exit == StepExit::Immediate
    }
}

/// Everything the interpreter reads besides the step itself
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub item: &'a CurriculumItem,
    pub profile: Profile,
    pub rules: &'a RuleSet,
    pub locale: Locale,
    pub audio_effect_delay: Duration,
    pub unblur_lead: Duration,
}

impl<'a> StepContext<'a> {
    pub fn new(
        item: &'a CurriculumItem,
        profile: Profile,
        rules: &'a RuleSet,
        settings: &PlayerConfig,
    ) -> Self {
        Self {
            item,
            profile,
            rules,
            locale: settings.locale,
            audio_effect_delay: Duration::from_millis(settings.audio_effect_delay_ms),
            unblur_lead: Duration::from_millis(settings.unblur_lead_ms),
        }
    }

    fn name(&self) -> &'a str {
        self.item.display_name(self.locale)
    }
}

/// Exit rule shared by every kind: tap beats timer, timer beats immediate.
/// A positive duration always times out; `Step::auto_advance` and
/// `RuleSet::advance_mode` describe the profile and do not gate the exit.
fn exit_for(step: &Step) -> StepExit {
    if step.wait_for_tap || step.kind == StepKind::Interaction {
        StepExit::WaitForTap
    } else if step.duration_ms > 0 {
        StepExit::After(Duration::from_millis(step.duration_ms))
    } else {
        StepExit::Immediate
    }
}

/// Plan one step
pub fn plan_step(step: &Step, ctx: &StepContext<'_>) -> StepPlan {
    let mut cues = Vec::new();
    let mut delayed = Vec::new();
    let narrate = |text: String| Cue::Narrate(text);

    match step.kind {
        StepKind::Visual => {
            cues.push(Cue::Show(Visual::Glyph(ctx.item.glyph.clone())));
            if !step.silent {
                cues.push(narrate(ctx.name().to_string()));
            }
        }
        StepKind::Audio => {
            if !step.silent {
                let text = if step.enthusiastic {
                    phrases::enthusiastic(ctx.name(), ctx.locale)
                } else {
                    ctx.name().to_string()
                };
                cues.push(narrate(text));
            }
            if let Some(sound) = &ctx.item.sound_effect {
                delayed.push((ctx.audio_effect_delay, Cue::Effect(sound.clone())));
            }
        }
        StepKind::VisualAudio => {
            cues.push(Cue::Show(Visual::Glyph(ctx.item.glyph.clone())));
            if !step.silent {
                cues.push(narrate(ctx.name().to_string()));
            }
        }
        StepKind::Context => match &ctx.item.context_image {
            Some(image) => {
                let duration = Duration::from_millis(step.duration_ms);
                // Too short to show the blur at all
                let blurred = step.blur && duration > ctx.unblur_lead;
                cues.push(Cue::Show(Visual::ContextImage {
                    image: image.clone(),
                    blurred,
                }));
                if blurred {
                    delayed.push((duration - ctx.unblur_lead, Cue::Show(Visual::ClearBlur)));
                }
            }
            None => cues.push(Cue::Show(Visual::Glyph(ctx.item.glyph.clone()))),
        },
        StepKind::Song => {
            if !step.silent {
                cues.push(narrate(phrases::sing_along(ctx.name(), ctx.locale)));
            }
            cues.push(Cue::Effect(WELCOME_EFFECT.to_string()));
        }
        StepKind::Social => {
            if !step.silent {
                if let Some(text) = phrases::social(ctx.profile, ctx.name(), ctx.locale) {
                    cues.push(narrate(text));
                }
            }
        }
        StepKind::Interaction => {}
        StepKind::Feedback => {
            let auditory = ctx.rules.favors_auditory_reinforcement();
            cues.push(Cue::Show(Visual::Celebration));
            cues.push(Cue::Effect(SUCCESS_EFFECT.to_string()));
            if !step.silent {
                let strong = auditory || step.enthusiastic;
                cues.push(narrate(phrases::praise(strong, ctx.locale).to_string()));
            }
            if auditory {
                cues.push(Cue::Effect(CELEBRATION_EFFECT.to_string()));
            }
        }
        StepKind::LetterName | StepKind::LetterSound => {
            let field = if step.kind == StepKind::LetterName {
                ctx.item.letter_name.as_ref()
            } else {
                ctx.item.phonetic.as_ref()
            };
            // Non-letter items reuse letter sequences without stalling
            let Some(text) = field else {
                return StepPlan::skip();
            };
            if !step.silent {
                cues.push(narrate(text.get(ctx.locale).to_string()));
            }
        }
    }

    StepPlan {
        cues,
        delayed,
        exit: exit_for(step),
    }
}
