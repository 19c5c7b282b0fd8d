//! Real-time card driver
//!
//! Runs a [`SequencePlayer`] on a tokio runtime. Timers are sleep tasks that
//! post [`CardEvent::Timer`] back to the card's channel; user input (tap,
//! repeat, finish, quit) arrives on the same channel, so the player is only
//! ever touched from the single loop in [`play_card`].

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::engine::SequencePlayer;
use super::host::{Presenter, Scheduler, TimerHandle, TimerToken, Visual};
use super::state::PlayerStatus;
use crate::adaptation::PerformanceSnapshot;
use crate::profile::{Phase, Step};
use crate::types::Locale;

/// Events consumed by the card loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardEvent {
    Timer(TimerToken),
    Tap,
    Repeat,
    Finish,
    /// Leave the card without finishing
    Quit,
}

pub type CardSender = mpsc::UnboundedSender<CardEvent>;
pub type CardReceiver = mpsc::UnboundedReceiver<CardEvent>;

/// Channel for one card
pub fn card_channel() -> (CardSender, CardReceiver) {
    mpsc::unbounded_channel()
}

/// Scheduler backed by tokio sleep tasks
pub struct TokioScheduler {
    events: CardSender,
    next_handle: u64,
    tasks: HashMap<u64, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(events: CardSender) -> Self {
        Self {
            events,
            next_handle: 0,
            tasks: HashMap::new(),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn schedule_after(&mut self, delay: Duration, token: TimerToken) -> TimerHandle {
        self.tasks.retain(|_, task| !task.is_finished());

        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;

        let events = self.events.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The card loop may be gone already
            let _ = events.send(CardEvent::Timer(token));
        });
        self.tasks.insert(handle.0, task);
        handle
    }

    fn cancel_timer(&mut self, handle: TimerHandle) {
        if let Some(task) = self.tasks.remove(&handle.0) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

/// Host pairing a presenter with the tokio scheduler
pub struct TokioHost<P: Presenter> {
    presenter: P,
    scheduler: TokioScheduler,
}

impl<P: Presenter> TokioHost<P> {
    pub fn new(presenter: P, events: CardSender) -> Self {
        Self {
            presenter,
            scheduler: TokioScheduler::new(events),
        }
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }
}

impl<P: Presenter> Presenter for TokioHost<P> {
    fn narrate(&mut self, text: &str, locale: Locale) {
        self.presenter.narrate(text, locale);
    }

    fn stop_narration(&mut self) {
        self.presenter.stop_narration();
    }

    fn play_effect(&mut self, tag: &str) {
        self.presenter.play_effect(tag);
    }

    fn show(&mut self, visual: &Visual) {
        self.presenter.show(visual);
    }

    fn on_step_change(&mut self, phase: Phase, index: usize, step: &Step) {
        self.presenter.on_step_change(phase, index, step);
    }

    fn on_finished(&mut self) {
        self.presenter.on_finished();
    }
}

impl<P: Presenter> Scheduler for TokioHost<P> {
    fn now(&self) -> DateTime<Utc> {
        self.scheduler.now()
    }

    fn schedule_after(&mut self, delay: Duration, token: TimerToken) -> TimerHandle {
        self.scheduler.schedule_after(delay, token)
    }

    fn cancel_timer(&mut self, handle: TimerHandle) {
        self.scheduler.cancel_timer(handle);
    }
}

/// How a card ended
#[derive(Debug, Clone, Default)]
pub struct CardOutcome {
    /// Repeat snapshots in order, then the finish snapshot if any
    pub snapshots: Vec<PerformanceSnapshot>,
    pub completed: bool,
}

/// Drive a card until it is finished, quit, or its channel closes
pub async fn play_card<P: Presenter>(
    player: &mut SequencePlayer<TokioHost<P>>,
    events: &mut CardReceiver,
) -> CardOutcome {
    let mut outcome = CardOutcome::default();
    player.start();

    while let Some(event) = events.recv().await {
        match event {
            CardEvent::Timer(token) => player.on_timer(token),
            CardEvent::Tap => player.tap(),
            CardEvent::Repeat => {
                if let Some(snapshot) = player.repeat() {
                    outcome.snapshots.push(snapshot);
                }
            }
            CardEvent::Finish => match player.finish() {
                Some(snapshot) => {
                    outcome.snapshots.push(snapshot);
                    outcome.completed = true;
                    break;
                }
                None => debug!("Finish requested before the sequence ended"),
            },
            CardEvent::Quit => {
                player.cancel();
                break;
            }
        }
    }

    if player.status() != PlayerStatus::Closed {
        player.cancel();
    }
    info!(
        "Card '{}' ended (completed: {}, repeats: {})",
        player.item().id,
        outcome.completed,
        outcome.snapshots.iter().filter(|s| s.repeated).count()
    );
    outcome
}
