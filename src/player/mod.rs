//! Sequence player
//!
//! Plays one curriculum item through its profile's intro, learning and
//! feedback steps. The state machine lives in [`engine`], the per-step
//! presentation rules in [`interpreter`]; hosts supply clock and output.

pub mod engine;
pub mod host;
pub mod interpreter;
pub mod runtime;
pub mod state;
pub mod virtual_host;

pub use engine::SequencePlayer;
pub use host::{PresentationHost, Presenter, Scheduler, TimerHandle, TimerKind, TimerToken, Visual};
pub use interpreter::{plan_step, Cue, StepContext, StepExit, StepPlan};
pub use runtime::{
    card_channel, play_card, CardEvent, CardOutcome, CardReceiver, CardSender, TokioHost, TokioScheduler,
};
pub use state::{PlayerState, PlayerStatus};
pub use virtual_host::{HostEvent, VirtualHost};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::{Catalog, CurriculumItem};
    use crate::profile::{Phase, Profile, Step, StepKind};
    use crate::types::Locale;
    use chrono::{DateTime, Utc};
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    fn item(id: &str) -> CurriculumItem {
        Catalog::builtin().get(id).unwrap().clone()
    }

    fn player(profile: Profile, id: &str) -> SequencePlayer<VirtualHost> {
        SequencePlayer::new(VirtualHost::new(), profile, item(id))
    }

    #[test]
    fn test_empty_intro_enters_learning_at_once() {
        let mut p = player(Profile::Adhd, "animal-dog");
        p.start();

        let state = p.state();
        assert_eq!(state.phase, Phase::Learning);
        assert_eq!(state.step_index, 0);
        assert_eq!(state.status, PlayerStatus::Playing);
        assert_eq!(p.host().elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_letter_steps_skipped_for_non_letter_item() {
        let mut p = player(Profile::Autism, "fruit-apple");
        p.start();
        // intro: 2500 + 3000
        p.advance_time(Duration::from_millis(5500));

        let state = p.state();
        assert_eq!(state.phase, Phase::Learning);
        assert_eq!(p.current_step().map(|s| s.kind), Some(StepKind::Context));

        let kinds: Vec<StepKind> = p.host().step_changes().into_iter().map(|(_, _, k)| k).collect();
        assert!(!kinds.contains(&StepKind::LetterName));
        assert!(!kinds.contains(&StepKind::LetterSound));
    }

    #[test]
    fn test_interaction_waits_indefinitely() {
        let mut p = player(Profile::Other, "animal-cat");
        p.start();
        // intro 2500, then visual 2000 + audio 2500 + context 3000 + social 1500
        p.advance_time(Duration::from_millis(11_500));
        assert_eq!(p.status(), PlayerStatus::WaitingForTap);
        assert_eq!(p.current_step().map(|s| s.kind), Some(StepKind::Interaction));

        p.advance_time(Duration::from_secs(3600));
        assert_eq!(p.status(), PlayerStatus::WaitingForTap);
        assert_eq!(p.host().scheduled(), 0);

        p.tap();
        assert_eq!(p.state().phase, Phase::Feedback);
    }

    #[test]
    fn test_tap_while_playing_is_noop() {
        let mut p = player(Profile::Other, "animal-cat");
        p.start();
        let before = p.state();

        p.tap();
        p.tap();
        assert_eq!(p.state(), before);
        assert_eq!(p.pending_timers(), 1);
    }

    #[test]
    fn test_repeat_drops_stale_timers() {
        let mut p = player(Profile::Other, "animal-cat");
        p.start();
        p.advance_time(Duration::from_millis(3000));
        assert_eq!(p.state().phase, Phase::Learning);
        let old_epoch = p.state().epoch;

        let snapshot = p.repeat().unwrap();
        assert!(snapshot.repeated);
        assert!(!snapshot.completed);
        assert_eq!(p.state().phase, Phase::Intro);
        assert_eq!(p.state().step_index, 0);
        assert!(p.state().epoch > old_epoch);

        // A late timer from before the restart must not move the player
        let stale = TimerToken {
            epoch: old_epoch,
            id: 0,
            kind: TimerKind::Advance,
        };
        p.host_mut().inject(Duration::from_millis(10), stale);
        p.advance_time(Duration::from_millis(100));
        assert_eq!(p.state().phase, Phase::Intro);
        assert_eq!(p.state().step_index, 0);
    }

    #[test]
    fn test_repeat_stops_narration() {
        let mut p = player(Profile::Other, "animal-cat");
        p.start();
        p.repeat();
        assert!(p
            .host()
            .events()
            .iter()
            .any(|(_, e)| *e == HostEvent::NarrationStopped));
    }

    #[test]
    fn test_context_unblurs_before_step_ends() {
        let mut p = player(Profile::Other, "animal-dog");
        p.start();
        // intro 2500 + visual 2000 + audio 2500 lands on the context step
        p.advance_time(Duration::from_millis(7000));
        assert_eq!(p.current_step().map(|s| s.kind), Some(StepKind::Context));

        p.advance_time(Duration::from_millis(3000));
        let cleared_at = p
            .host()
            .events()
            .iter()
            .find(|(_, e)| *e == HostEvent::Shown(Visual::ClearBlur))
            .map(|(t, _)| *t);
        assert_eq!(cleared_at, Some(Duration::from_millis(7000 + 3000 - 150)));
    }

    #[test]
    fn test_audio_effect_follows_narration() {
        let mut p = player(Profile::Other, "animal-dog");
        p.start();
        p.advance_time(Duration::from_millis(4500));
        assert_eq!(p.current_step().map(|s| s.kind), Some(StepKind::Audio));
        assert!(p.host().effects().is_empty());

        p.advance_time(Duration::from_millis(400));
        assert_eq!(p.host().effects(), vec!["bark"]);
    }

    #[test]
    fn test_finish_only_after_sequence_ends() {
        let mut p = player(Profile::Williams, "animal-lion");
        p.start();
        assert!(p.finish().is_none());

        assert!(p.run_to_end(64));
        assert_eq!(p.status(), PlayerStatus::Finished);
        assert_eq!(p.host().events().last().map(|(_, e)| e.clone()), Some(HostEvent::Finished));

        let snapshot = p.finish().unwrap();
        assert!(snapshot.completed);
        assert!(!snapshot.repeated);
        assert_eq!(snapshot.item_id, "animal-lion");
        assert_eq!(p.status(), PlayerStatus::Closed);

        assert!(p.finish().is_none());
        assert!(p.repeat().is_none());
    }

    #[test]
    fn test_cancel_drops_timers() {
        let mut p = player(Profile::DownSyndrome, "song-farm");
        p.start();
        assert!(p.pending_timers() > 0);

        p.cancel();
        assert_eq!(p.status(), PlayerStatus::Cancelled);
        assert_eq!(p.pending_timers(), 0);
        assert_eq!(p.host().scheduled(), 0);

        let before = p.state();
        p.advance_time(Duration::from_secs(60));
        assert_eq!(p.state(), before);
    }

    #[test]
    fn test_every_profile_plays_every_item() {
        for profile in Profile::all() {
            for catalog_item in Catalog::builtin().items() {
                let mut p = SequencePlayer::new(VirtualHost::new(), *profile, catalog_item.clone());
                assert!(p.run_to_end(64), "{} stalled on {}", profile, catalog_item.id);
            }
        }
    }

    /// Counts `stop_narration` calls, delegating everything else
    struct CountingHost {
        inner: VirtualHost,
        stops: Rc<Cell<usize>>,
    }

    impl Presenter for CountingHost {
        fn narrate(&mut self, text: &str, locale: Locale) {
            self.inner.narrate(text, locale);
        }

        fn stop_narration(&mut self) {
            self.stops.set(self.stops.get() + 1);
            self.inner.stop_narration();
        }

        fn play_effect(&mut self, tag: &str) {
            self.inner.play_effect(tag);
        }

        fn show(&mut self, visual: &Visual) {
            self.inner.show(visual);
        }

        fn on_step_change(&mut self, phase: Phase, index: usize, step: &Step) {
            self.inner.on_step_change(phase, index, step);
        }

        fn on_finished(&mut self) {
            self.inner.on_finished();
        }
    }

    impl Scheduler for CountingHost {
        fn now(&self) -> DateTime<Utc> {
            self.inner.now()
        }

        fn schedule_after(&mut self, delay: Duration, token: TimerToken) -> TimerHandle {
            self.inner.schedule_after(delay, token)
        }

        fn cancel_timer(&mut self, handle: TimerHandle) {
            self.inner.cancel_timer(handle);
        }
    }

    fn counting_player(id: &str) -> (SequencePlayer<CountingHost>, Rc<Cell<usize>>) {
        let stops = Rc::new(Cell::new(0));
        let host = CountingHost {
            inner: VirtualHost::new(),
            stops: stops.clone(),
        };
        (SequencePlayer::new(host, Profile::Other, item(id)), stops)
    }

    #[test]
    fn test_drop_while_playing_stops_narration() {
        let (mut p, stops) = counting_player("animal-cat");
        p.start();
        assert_eq!(p.status(), PlayerStatus::Playing);
        drop(p);
        assert_eq!(stops.get(), 1);

        let (mut p, stops) = counting_player("animal-cat");
        p.start();
        while p.status() == PlayerStatus::Playing {
            let due = p.host().inner.next_due().unwrap();
            let token = p.host_mut().inner.pop_due(due).unwrap();
            p.on_timer(token);
        }
        assert_eq!(p.status(), PlayerStatus::WaitingForTap);
        drop(p);
        assert_eq!(stops.get(), 1);
    }

    #[test]
    fn test_drop_when_idle_leaves_narration_alone() {
        let (p, stops) = counting_player("animal-cat");
        drop(p);
        assert_eq!(stops.get(), 0);

        let (mut p, stops) = counting_player("animal-cat");
        p.start();
        p.cancel();
        let after_cancel = stops.get();
        drop(p);
        assert_eq!(stops.get(), after_cancel);
    }
}
