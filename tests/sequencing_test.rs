//! End-to-end tests for profile sequencing, sessions and adaptation

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use std::collections::HashMap;
use std::time::Duration;

use learnpath::adaptation::{evaluate, AdaptationThresholds, PerformanceSnapshot};
use learnpath::curriculum::{Catalog, Category, CurriculumItem};
use learnpath::player::{
    card_channel, CardEvent, CardReceiver, CardSender, HostEvent, PlayerStatus, SequencePlayer, TimerKind,
    TimerToken, VirtualHost,
};
use learnpath::profile::{
    resolve_rule_set, resolve_sequence, AnimationIntensity, ErrorHandling, Phase, Profile, StepKind,
};
use learnpath::progress::{LearnerProgress, ProgressStore};
use learnpath::session::{generate_session, SessionGenerator};
use learnpath::types::LocalizedText;

#[test]
fn test_every_key_resolves() {
    for key in ["autism", "ADHD", "Down Syndrome", "williams", "dyslexia", "other", "", "martian", "🦄"] {
        let rules = resolve_rule_set(key);
        let sequence = resolve_sequence(key);
        assert!(rules.session_limit_minutes > 0, "{}", key);
        assert!(sequence.total_steps() > 0, "{}", key);
    }
    assert_eq!(resolve_rule_set("martian"), Profile::Other.rule_set());
}

#[test]
fn test_empty_phases_take_no_time() {
    for profile in Profile::all() {
        let sequence = profile.sequence();
        let item = Catalog::builtin().get("animal-cow").unwrap().clone();
        let mut player = SequencePlayer::new(VirtualHost::new(), *profile, item);
        player.start();

        let first_non_empty = Phase::all()
            .iter()
            .copied()
            .find(|phase| !sequence.steps(*phase).is_empty())
            .unwrap();
        assert_eq!(player.state().phase, first_non_empty, "{}", profile);
        assert_eq!(player.host().elapsed(), Duration::ZERO);
    }
}

#[test]
fn test_autism_sequence_on_fruit_skips_letter_steps() {
    let item = Catalog::builtin().get("fruit-banana").unwrap().clone();
    let mut player = SequencePlayer::new(VirtualHost::new(), Profile::Autism, item);
    player.start();
    player.advance_time(Duration::from_millis(5500));

    let entered: Vec<(Phase, usize, StepKind)> = player.host().step_changes();
    let last = entered.last().copied().unwrap();
    assert_eq!(last, (Phase::Learning, 2, StepKind::Context));

    // Entered at the same instant the intro ended
    let context_at = player
        .host()
        .events()
        .iter()
        .find(|(_, e)| matches!(e, HostEvent::StepChanged { kind: StepKind::Context, .. }))
        .map(|(t, _)| *t);
    assert_eq!(context_at, Some(Duration::from_millis(5500)));
}

#[test]
fn test_letter_item_plays_letter_steps() {
    let item = Catalog::builtin().get("letter-a").unwrap().clone();
    let mut player = SequencePlayer::new(VirtualHost::new(), Profile::Autism, item);
    player.start();
    player.advance_time(Duration::from_millis(5500));
    assert_eq!(player.current_step().map(|s| s.kind), Some(StepKind::LetterName));
}

#[test]
fn test_dyslexia_letter_name_waits_for_tap() {
    let item = Catalog::builtin().get("letter-m").unwrap().clone();
    let mut player = SequencePlayer::new(VirtualHost::new(), Profile::Dyslexia, item);
    player.start();
    player.advance_time(Duration::from_millis(2000));
    assert_eq!(player.status(), PlayerStatus::WaitingForTap);

    player.advance_time(Duration::from_secs(24 * 3600));
    assert_eq!(player.status(), PlayerStatus::WaitingForTap);
    assert_eq!(player.current_step().map(|s| s.kind), Some(StepKind::LetterName));

    player.tap();
    assert_eq!(player.current_step().map(|s| s.kind), Some(StepKind::LetterSound));
}

#[test]
fn test_repeat_from_every_position() {
    let item = Catalog::builtin().get("animal-duck").unwrap().clone();
    let total = Profile::Williams.sequence().total_steps();

    for stop_after in 0..total {
        let mut player = SequencePlayer::new(VirtualHost::new(), Profile::Williams, item.clone());
        player.start();
        for _ in 0..stop_after {
            if player.status() == PlayerStatus::WaitingForTap {
                player.tap();
            } else {
                player.fire_next();
            }
        }
        let abandoned = player.state();

        player.repeat();
        let state = player.state();
        assert_eq!((state.phase, state.step_index), (Phase::Intro, 0));
        assert_ne!(state.epoch, abandoned.epoch);

        // Every timer the abandoned step could have owned is now stale
        for id in 0..32 {
            player.host_mut().inject(
                Duration::from_millis(1),
                TimerToken {
                    epoch: abandoned.epoch,
                    id,
                    kind: TimerKind::Advance,
                },
            );
        }
        player.advance_time(Duration::from_millis(5));
        let state = player.state();
        assert_eq!((state.phase, state.step_index), (Phase::Intro, 0));
    }
}

#[test]
fn test_session_targets_first_eligible_module() {
    let catalog = Catalog::builtin();
    let session = generate_session("down-syndrome", 4, &HashMap::new(), catalog).unwrap();
    assert!(session.items.len() <= 8);
    assert!(session.items.iter().all(|i| i.category == Category::Songs));

    let all_mastered: HashMap<String, u32> =
        catalog.items().iter().map(|i| (i.id.clone(), 7)).collect();
    let session = generate_session("down-syndrome", 4, &all_mastered, catalog).unwrap();
    assert!(!session.items.is_empty());
}

#[test]
fn test_evaluate_empty_and_struggling() {
    let rules = Profile::Adhd.rule_set();
    let thresholds = AdaptationThresholds::default();
    assert!(evaluate(rules, &[], &thresholds).is_empty());

    let start = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
    let snapshots: Vec<PerformanceSnapshot> = [true, true, true, false, false]
        .iter()
        .enumerate()
        .map(|(i, repeated)| {
            let at = start + ChronoDuration::minutes(5 * i as i64);
            if *repeated {
                PerformanceSnapshot::repeat("animal-dog", at)
            } else {
                PerformanceSnapshot::finish("animal-dog", at)
            }
        })
        .collect();

    let overrides = evaluate(rules, &snapshots, &thresholds);
    assert_eq!(overrides.animation_intensity, Some(AnimationIntensity::Low));
    assert_eq!(overrides.error_handling, Some(ErrorHandling::Errorless));
}

#[test]
fn test_feedback_loop_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProgressStore::with_dir(dir.path().to_path_buf()).unwrap();
    let catalog = Catalog::builtin();
    let generator = SessionGenerator::default();
    let thresholds = AdaptationThresholds::default();

    let mut progress = LearnerProgress::new("Bia", "adhd", 4);
    let first = generator
        .generate(&progress.effective_rules(), progress.age, &progress.mastery, catalog)
        .unwrap();
    assert!(first.items.iter().all(|i| i.category == Category::Animals));

    // Struggle on every card: repeat twice, then finish
    for item in &first.items {
        let mut player = SequencePlayer::new(VirtualHost::new(), progress.profile(), item.clone())
            .with_rules(progress.effective_rules());
        player.start();
        for _ in 0..2 {
            player.advance_time(Duration::from_millis(1000));
            progress.record_snapshot(player.repeat().unwrap());
        }
        assert!(player.run_to_end(64));
        progress.record_snapshot(player.finish().unwrap());
    }

    let window = progress.recent_window(10).to_vec();
    let overrides = evaluate(&progress.effective_rules(), &window, &thresholds);
    progress.merge_overrides(&overrides);
    store.save(&progress).unwrap();

    let progress = store.load("Bia").unwrap().unwrap();
    let rules = progress.effective_rules();
    assert_eq!(rules.animation_intensity, AnimationIntensity::Low);
    assert_eq!(rules.error_handling, ErrorHandling::Errorless);
    assert_eq!(Profile::Adhd.rule_set().animation_intensity, AnimationIntensity::High);
    for item in &first.items {
        assert_eq!(progress.mastery_of(&item.id), 1);
    }
}

#[test]
fn test_mastered_items_rotate_out() {
    let catalog = Catalog::builtin();
    let mut progress = LearnerProgress::new("Caio", "adhd", 4);
    let first = SessionGenerator::default()
        .generate(&progress.effective_rules(), progress.age, &progress.mastery, catalog)
        .unwrap();

    let finished_at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
    for item in &first.items {
        for _ in 0..3 {
            progress.record_snapshot(PerformanceSnapshot::finish(item.id.clone(), finished_at));
        }
    }

    let next = SessionGenerator::default()
        .generate(&progress.effective_rules(), progress.age, &progress.mastery, catalog)
        .unwrap();
    assert!(next.items.iter().all(|i| !first.items.contains(i)));
    assert!(next.items.iter().all(|i| i.category == Category::Animals));
}

#[test]
fn test_custom_catalog_drives_player() {
    let json = r#"[
        {
            "id": "kiwi",
            "name": {"en": "kiwi", "pt": "kiwi"},
            "glyph": "🥝",
            "category": "fruits",
            "difficulty": 2
        }
    ]"#;
    let catalog = Catalog::from_json_str(json).unwrap();
    let item: CurriculumItem = catalog.get("kiwi").unwrap().clone();
    assert_eq!(item.name, LocalizedText::new("kiwi", "kiwi"));

    let mut player = SequencePlayer::new(VirtualHost::new(), Profile::Dyslexia, item);
    assert!(player.run_to_end(64));
    assert!(player.host().narrations().contains(&"kiwi"));
}

#[test]
fn test_card_channel_types_are_public() {
    let (tx, mut rx): (CardSender, CardReceiver) = card_channel();
    let input: CardSender = tx.clone();
    input.send(CardEvent::Tap).unwrap();
    tx.send(CardEvent::Quit).unwrap();
    assert_eq!(rx.try_recv().unwrap(), CardEvent::Tap);
    assert_eq!(rx.try_recv().unwrap(), CardEvent::Quit);
}
