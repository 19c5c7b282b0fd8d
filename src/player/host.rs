//! Host collaborators for the sequence player
//!
//! The player owns no clock and no audio. It hands presentation effects to a
//! [`Presenter`] and timing to a [`Scheduler`]; a type implementing both is a
//! [`PresentationHost`].

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::profile::{Phase, Step};
use crate::types::Locale;

/// Opaque handle returned by [`Scheduler::schedule_after`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Leave the current step
    Advance,
    /// Run the step's n-th delayed cue
    Cue(usize),
}

/// Tag carried by every timer. A token whose epoch differs from the
/// player's current epoch is stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken {
    pub epoch: u64,
    pub id: u64,
    pub kind: TimerKind,
}

/// Visual effect requested by a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visual {
    /// The item's primary glyph or art
    Glyph(String),
    /// The item's context image, possibly obscured
    ContextImage { image: String, blurred: bool },
    /// Remove the obscuring effect from the context image
    ClearBlur,
    /// Success animation
    Celebration,
}

/// Fire-and-forget presentation side of the host
pub trait Presenter {
    /// Speak text; the player never waits for completion
    fn narrate(&mut self, text: &str, locale: Locale);

    /// Abort in-flight narration
    fn stop_narration(&mut self) {}

    /// Play a short sound cue
    fn play_effect(&mut self, tag: &str);

    fn show(&mut self, _visual: &Visual) {}

    fn on_step_change(&mut self, _phase: Phase, _index: usize, _step: &Step) {}

    fn on_finished(&mut self) {}
}

/// Timer primitives supplied by the host's event loop
pub trait Scheduler {
    fn now(&self) -> DateTime<Utc>;

    /// Arrange for `token` to be delivered to the player's `on_timer` after
    /// `delay`
    fn schedule_after(&mut self, delay: Duration, token: TimerToken) -> TimerHandle;

    /// Cancel a timer. Must be idempotent; unknown or already-fired handles
    /// are ignored.
    fn cancel_timer(&mut self, handle: TimerHandle);
}

/// Everything the player needs from its host
pub trait PresentationHost: Presenter + Scheduler {}

impl<T: Presenter + Scheduler> PresentationHost for T {}
