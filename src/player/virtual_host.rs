//! Deterministic host with a virtual clock
//!
//! Records every presentation effect and keeps timers in a queue that only
//! moves when the caller advances time. Used for simulation and tests.

use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;

use super::engine::SequencePlayer;
use super::host::{Presenter, Scheduler, TimerHandle, TimerToken, Visual};
use crate::profile::{Phase, Step, StepKind};
use crate::types::Locale;

/// Something the host was asked to do, stamped with virtual time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Narrated { text: String, locale: Locale },
    NarrationStopped,
    Effect(String),
    Shown(Visual),
    StepChanged { phase: Phase, index: usize, kind: StepKind },
    Finished,
}

#[derive(Debug, Clone)]
struct PendingTimer {
    handle: TimerHandle,
    due: Duration,
    token: TimerToken,
}

#[derive(Debug, Clone)]
pub struct VirtualHost {
    origin: DateTime<Utc>,
    elapsed: Duration,
    next_handle: u64,
    timers: Vec<PendingTimer>,
    events: Vec<(Duration, HostEvent)>,
}

impl VirtualHost {
    pub fn new() -> Self {
        let origin = Utc
            .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self::starting_at(origin)
    }

    pub fn starting_at(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            elapsed: Duration::ZERO,
            next_handle: 0,
            timers: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Virtual time since the host was created
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn events(&self) -> &[(Duration, HostEvent)] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn narrations(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|(_, e)| match e {
                HostEvent::Narrated { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn effects(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|(_, e)| match e {
                HostEvent::Effect(tag) => Some(tag.as_str()),
                _ => None,
            })
            .collect()
    }

    /// `(phase, index, kind)` of every step entered, in order
    pub fn step_changes(&self) -> Vec<(Phase, usize, StepKind)> {
        self.events
            .iter()
            .filter_map(|(_, e)| match e {
                HostEvent::StepChanged { phase, index, kind } => Some((*phase, *index, *kind)),
                _ => None,
            })
            .collect()
    }

    /// Timers still queued
    pub fn scheduled(&self) -> usize {
        self.timers.len()
    }

    /// When the earliest queued timer is due
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its due time
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerToken> {
        let pos = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.handle))
            .map(|(i, _)| i)?;
        let timer = self.timers.remove(pos);
        self.elapsed = self.elapsed.max(timer.due);
        Some(timer.token)
    }

    /// Queue a timer token directly, bypassing the player. Lets tests
    /// deliver a timer the player has already cancelled.
    pub fn inject(&mut self, delay: Duration, token: TimerToken) -> TimerHandle {
        self.schedule_after(delay, token)
    }

    fn record(&mut self, event: HostEvent) {
        self.events.push((self.elapsed, event));
    }
}

impl Default for VirtualHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for VirtualHost {
    fn narrate(&mut self, text: &str, locale: Locale) {
        self.record(HostEvent::Narrated {
            text: text.to_string(),
            locale,
        });
    }

    fn stop_narration(&mut self) {
        self.record(HostEvent::NarrationStopped);
    }

    fn play_effect(&mut self, tag: &str) {
        self.record(HostEvent::Effect(tag.to_string()));
    }

    fn show(&mut self, visual: &Visual) {
        self.record(HostEvent::Shown(visual.clone()));
    }

    fn on_step_change(&mut self, phase: Phase, index: usize, step: &Step) {
        self.record(HostEvent::StepChanged {
            phase,
            index,
            kind: step.kind,
        });
    }

    fn on_finished(&mut self) {
        self.record(HostEvent::Finished);
    }
}

impl Scheduler for VirtualHost {
    fn now(&self) -> DateTime<Utc> {
        let offset = chrono::Duration::from_std(self.elapsed).unwrap_or_else(|_| chrono::Duration::zero());
        self.origin + offset
    }

    fn schedule_after(&mut self, delay: Duration, token: TimerToken) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.timers.push(PendingTimer {
            handle,
            due: self.elapsed + delay,
            token,
        });
        handle
    }

    fn cancel_timer(&mut self, handle: TimerHandle) {
        self.timers.retain(|t| t.handle != handle);
    }
}

impl SequencePlayer<VirtualHost> {
    /// Move virtual time forward, delivering every timer that falls due in
    /// order. Returns how many timers fired.
    pub fn advance_time(&mut self, by: Duration) -> usize {
        let until = self.host().elapsed() + by;
        let mut fired = 0;
        while let Some(token) = self.host_mut().pop_due(until) {
            self.on_timer(token);
            fired += 1;
        }
        let host = self.host_mut();
        host.elapsed = host.elapsed.max(until);
        fired
    }

    /// Jump to the next queued timer and deliver it. `false` when nothing
    /// is queued.
    pub fn fire_next(&mut self) -> bool {
        let Some(due) = self.host().next_due() else {
            return false;
        };
        match self.host_mut().pop_due(due) {
            Some(token) => {
                self.on_timer(token);
                true
            }
            None => false,
        }
    }

    /// Play until the sequence finishes, tapping through every suspension.
    /// Gives up after `max_events` timers/taps.
    pub fn run_to_end(&mut self, max_events: usize) -> bool {
        use super::state::PlayerStatus;

        for _ in 0..max_events {
            match self.status() {
                PlayerStatus::Finished | PlayerStatus::Closed | PlayerStatus::Cancelled => return true,
                PlayerStatus::WaitingForTap => self.tap(),
                PlayerStatus::Idle => self.start(),
                PlayerStatus::Playing => {
                    if !self.fire_next() {
                        return false;
                    }
                }
            }
        }
        matches!(self.status(), PlayerStatus::Finished)
    }
}
