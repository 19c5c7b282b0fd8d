//! Sequence player - the timed state machine
//!
//! Walks intro, learning and feedback steps in order. Each step is planned by
//! the pure interpreter, its cues handed to the host, and its exit either
//! taken immediately, scheduled on a timer, or suspended until a tap.
//!
//! Every step entry bumps the epoch and cancels the previous step's timers,
//! so a timer that fires late (after a tap, restart or cancel) is ignored.

use tracing::{debug, info, trace};

use super::host::{PresentationHost, TimerHandle, TimerKind, TimerToken};
use super::interpreter::{plan_step, Cue, StepContext, StepExit};
use super::state::{PlayerState, PlayerStatus};
use crate::adaptation::PerformanceSnapshot;
use crate::config::PlayerConfig;
use crate::curriculum::CurriculumItem;
use crate::profile::{Phase, Profile, RuleSet, Sequence, Step};

pub struct SequencePlayer<H: PresentationHost> {
    host: H,
    profile: Profile,
    rules: RuleSet,
    sequence: Sequence,
    item: CurriculumItem,
    settings: PlayerConfig,
    state: PlayerState,
    /// Timers belonging to the live step
    pending: Vec<(TimerToken, TimerHandle)>,
    /// Delayed cues of the live step, indexed by `TimerKind::Cue`
    delayed: Vec<Cue>,
    next_timer_id: u64,
}

impl<H: PresentationHost> SequencePlayer<H> {
    /// Player using the profile's base rule set and sequence
    pub fn new(host: H, profile: Profile, item: CurriculumItem) -> Self {
        Self {
            host,
            profile,
            rules: profile.rule_set().clone(),
            sequence: profile.sequence().clone(),
            item,
            settings: PlayerConfig::default(),
            state: PlayerState::new(),
            pending: Vec::new(),
            delayed: Vec::new(),
            next_timer_id: 0,
        }
    }

    /// Player for a free-form profile key (unknown keys use the default profile)
    pub fn for_profile_key(host: H, profile_key: &str, item: CurriculumItem) -> Self {
        Self::new(host, Profile::resolve(profile_key), item)
    }

    /// Use an effective rule set (base plus adaptation overrides)
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_sequence(mut self, sequence: Sequence) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn with_settings(mut self, settings: PlayerConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn status(&self) -> PlayerStatus {
        self.state.status
    }

    pub fn item(&self) -> &CurriculumItem {
        &self.item
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The live step, if any
    pub fn current_step(&self) -> Option<&Step> {
        if self.state.is_active() {
            self.sequence.step(self.state.phase, self.state.step_index)
        } else {
            None
        }
    }

    /// Number of timers the live step is waiting on
    pub fn pending_timers(&self) -> usize {
        self.pending.len()
    }

    /// Leave `Idle` and enter intro step 0
    pub fn start(&mut self) {
        if self.state.status != PlayerStatus::Idle {
            debug!("Start ignored, player is {}", self.state.status);
            return;
        }
        info!(
            "Playing '{}' with {} sequence ({} steps)",
            self.item.id,
            self.profile,
            self.sequence.total_steps()
        );
        self.enter(Phase::Intro, 0);
    }

    /// External tap. Only resumes a suspended step; otherwise a no-op so
    /// duplicate input is harmless.
    pub fn tap(&mut self) {
        if self.state.status != PlayerStatus::WaitingForTap {
            debug!("Tap ignored, player is {}", self.state.status);
            return;
        }
        debug!("Tap at {} step {}", self.state.phase, self.state.step_index);
        self.advance();
    }

    /// Deliver a fired timer. Stale tokens are dropped.
    pub fn on_timer(&mut self, token: TimerToken) {
        if !self.state.is_active() || token.epoch != self.state.epoch {
            debug!(
                "Ignoring stale timer (epoch {} vs {}, {})",
                token.epoch, self.state.epoch, self.state.status
            );
            return;
        }
        let Some(pos) = self.pending.iter().position(|(t, _)| t.id == token.id) else {
            debug!("Ignoring unknown timer {}", token.id);
            return;
        };
        self.pending.swap_remove(pos);

        match token.kind {
            TimerKind::Advance => self.advance(),
            TimerKind::Cue(index) => {
                if let Some(cue) = self.delayed.get(index).cloned() {
                    self.perform(&cue);
                }
            }
        }
    }

    /// Restart from intro step 0. Cancels the live step's timers and
    /// narration and records a repeat snapshot. No-op after `finish()`.
    pub fn repeat(&mut self) -> Option<PerformanceSnapshot> {
        if self.state.status == PlayerStatus::Closed {
            debug!("Repeat ignored, player is closed");
            return None;
        }

        self.leave_step();
        self.host.stop_narration();
        let snapshot = PerformanceSnapshot::repeat(self.item.id.clone(), self.host.now());

        self.state.status = PlayerStatus::Idle;
        self.state.phase = Phase::Intro;
        self.state.step_index = 0;
        info!("Repeating '{}'", self.item.id);

        self.start();
        Some(snapshot)
    }

    /// Close a finished card and record a completion snapshot. Only valid
    /// once every phase has played.
    pub fn finish(&mut self) -> Option<PerformanceSnapshot> {
        if self.state.status != PlayerStatus::Finished {
            debug!("Finish ignored, player is {}", self.state.status);
            return None;
        }

        self.leave_step();
        self.state.status = PlayerStatus::Closed;
        info!("Finished '{}'", self.item.id);
        Some(PerformanceSnapshot::finish(self.item.id.clone(), self.host.now()))
    }

    /// The host is leaving the card: drop timers and narration
    pub fn cancel(&mut self) {
        if self.state.status == PlayerStatus::Closed {
            return;
        }
        self.leave_step();
        self.host.stop_narration();
        self.state.status = PlayerStatus::Cancelled;
        debug!("Cancelled '{}'", self.item.id);
    }

    fn advance(&mut self) {
        self.enter(self.state.phase, self.state.step_index + 1);
    }

    /// Enter a position, walking forward through skipped steps and exhausted
    /// phases until something needs time, a tap, or the sequence ends.
    fn enter(&mut self, mut phase: Phase, mut index: usize) {
        loop {
            self.leave_step();
            self.state.phase = phase;
            self.state.step_index = index;

            let Some(step) = self.sequence.step(phase, index).cloned() else {
                match phase.next() {
                    Some(next) => {
                        debug!("Phase {} complete", phase);
                        phase = next;
                        index = 0;
                        continue;
                    }
                    None => {
                        self.state.status = PlayerStatus::Finished;
                        info!("Sequence complete for '{}'", self.item.id);
                        self.host.on_finished();
                        return;
                    }
                }
            };

            let plan = {
                let ctx = StepContext::new(&self.item, self.profile, &self.rules, &self.settings);
                plan_step(&step, &ctx)
            };

            if plan.is_skip() {
                trace!("Skipping {} step {} ({})", phase, index, step.kind);
                index += 1;
                continue;
            }

            self.state.status = PlayerStatus::Playing;
            debug!("Entering {} step {} ({})", phase, index, step.kind);
            self.host.on_step_change(phase, index, &step);

            for cue in &plan.cues {
                self.perform(cue);
            }
            for (i, (delay, cue)) in plan.delayed.into_iter().enumerate() {
                self.delayed.push(cue);
                self.schedule(delay, TimerKind::Cue(i));
            }

            match plan.exit {
                StepExit::Immediate => {
                    index += 1;
                }
                StepExit::After(duration) => {
                    self.schedule(duration, TimerKind::Advance);
                    return;
                }
                StepExit::WaitForTap => {
                    self.state.status = PlayerStatus::WaitingForTap;
                    return;
                }
            }
        }
    }

    /// Invalidate the live step: new epoch, cancel its timers, drop its cues
    fn leave_step(&mut self) {
        self.state.bump_epoch();
        for (_, handle) in self.pending.drain(..) {
            self.host.cancel_timer(handle);
        }
        self.delayed.clear();
    }

    fn schedule(&mut self, delay: std::time::Duration, kind: TimerKind) {
        let token = TimerToken {
            epoch: self.state.epoch,
            id: self.next_timer_id,
            kind,
        };
        self.next_timer_id += 1;
        let handle = self.host.schedule_after(delay, token);
        self.pending.push((token, handle));
    }

    fn perform(&mut self, cue: &Cue) {
        match cue {
            Cue::Show(visual) => self.host.show(visual),
            Cue::Narrate(text) => self.host.narrate(text, self.settings.locale),
            Cue::Effect(tag) => self.host.play_effect(tag),
        }
    }
}

impl<H: PresentationHost> Drop for SequencePlayer<H> {
    fn drop(&mut self) {
        if self.state.is_active() {
            self.host.stop_narration();
        }
        for (_, handle) in self.pending.drain(..) {
            self.host.cancel_timer(handle);
        }
    }
}
