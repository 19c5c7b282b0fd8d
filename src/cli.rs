//! CLI interface for learnpath

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::io::BufRead;
use tracing::warn;

use crate::adaptation::{evaluate, AdaptationThresholds, WindowMetrics};
use crate::config::{self, Config};
use crate::curriculum::{Catalog, Category, CurriculumItem};
use crate::player::{
    card_channel, play_card, CardEvent, CardSender, HostEvent, Presenter, SequencePlayer, TokioHost,
    VirtualHost, Visual,
};
use crate::profile::{Phase, Profile, Step};
use crate::progress::{LearnerProgress, ProgressStore};
use crate::session::SessionGenerator;
use crate::types::Locale;

#[derive(Parser)]
#[command(name = "learnpath")]
#[command(about = "Adaptive instructional sequencing for children with different learning profiles", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List learner profiles
    Profiles,
    /// Print a profile's rule set as JSON
    Rules {
        /// Profile key (unknown keys use the default profile)
        profile: String,
        /// Apply this learner's stored overrides
        #[arg(short, long)]
        learner: Option<String>,
    },
    /// Print a profile's step sequence
    Sequence {
        /// Profile key
        profile: String,
    },
    /// List curriculum items
    Catalog {
        /// Only items in this category (e.g. animals, body-parts)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Generate a learning session
    Session {
        /// Learner name
        #[arg(short, long, default_value = "default")]
        learner: String,
        /// Profile key (stored on the learner)
        #[arg(short, long)]
        profile: Option<String>,
        /// Child's age in years (stored on the learner)
        #[arg(short, long)]
        age: Option<u8>,
    },
    /// Play one learning card
    Play {
        /// Curriculum item id
        #[arg(short, long)]
        item: String,
        /// Learner name
        #[arg(short, long, default_value = "default")]
        learner: String,
        /// Profile key (stored on the learner)
        #[arg(short, long)]
        profile: Option<String>,
        /// Run on a virtual clock with automatic taps and print the timeline
        #[arg(short, long)]
        simulate: bool,
    },
    /// Adapt the learner's rules from recent performance
    Evaluate {
        /// Learner name
        #[arg(short, long, default_value = "default")]
        learner: String,
    },
    /// Show or reset configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            Cli::command().print_help().context("Failed to print help")?;
        }
        Some(Commands::Profiles) => {
            println!("Profiles");
            println!("========");
            for profile in Profile::all() {
                let rules = profile.rule_set();
                println!(
                    "  {:<14} {:>3} min  advance: {:?}  errors: {:?}  animation: {:?}",
                    profile.key(),
                    rules.session_limit_minutes,
                    rules.advance_mode,
                    rules.error_handling,
                    rules.animation_intensity
                );
            }
        }
        Some(Commands::Rules { profile, learner }) => {
            let rules = match learner {
                Some(name) => {
                    let store = ProgressStore::new()?;
                    match store.load(&name)? {
                        Some(progress) => progress.effective_rules(),
                        None => {
                            warn!("No stored progress for '{}', showing base rules", name);
                            Profile::resolve(&profile).rule_set().clone()
                        }
                    }
                }
                None => Profile::resolve(&profile).rule_set().clone(),
            };
            let json = serde_json::to_string_pretty(&rules).context("Failed to serialize rule set")?;
            println!("{}", json);
        }
        Some(Commands::Sequence { profile }) => {
            let profile = Profile::resolve(&profile);
            let sequence = profile.sequence();
            println!("{} sequence ({} steps)", profile, sequence.total_steps());
            for phase in Phase::all() {
                println!("{}:", phase);
                let steps = sequence.steps(*phase);
                if steps.is_empty() {
                    println!("  (empty)");
                }
                for (index, step) in steps.iter().enumerate() {
                    println!("  {}. {}", index, describe_step(step));
                }
            }
        }
        Some(Commands::Catalog { category }) => {
            let catalog = Catalog::builtin();
            let items: Vec<&CurriculumItem> = match category {
                Some(key) => {
                    let Some(category) = Category::parse(&key) else {
                        bail!("Unknown category '{}'", key);
                    };
                    catalog.by_category(category).collect()
                }
                None => catalog.items().iter().collect(),
            };
            for item in items {
                println!(
                    "  {} {:<16} {:<10} difficulty {}",
                    item.glyph, item.id, item.category, item.difficulty
                );
            }
        }
        Some(Commands::Session { learner, profile, age }) => {
            let config = Config::load()?;
            let store = ProgressStore::new()?;
            let progress = open_learner(&store, &config, &learner, profile, age)?;

            let rules = progress.effective_rules();
            let generator = SessionGenerator::new(config.session.mastery_threshold);
            let mut announce = |items: &[CurriculumItem], minutes: u32| {
                println!("Session for {}: {} item(s), about {} minutes", learner, items.len(), minutes);
            };
            let session = generator.generate_and_notify(
                &rules,
                progress.age,
                &progress.mastery,
                Catalog::builtin(),
                &mut announce,
            )?;
            for item in &session.items {
                println!(
                    "  {} {:<16} mastery {}/{}",
                    item.glyph,
                    item.id,
                    progress.mastery_of(&item.id),
                    generator.mastery_threshold()
                );
            }
        }
        Some(Commands::Play { item, learner, profile, simulate }) => {
            let config = Config::load()?;
            let store = ProgressStore::new()?;
            let mut progress = open_learner(&store, &config, &learner, profile, None)?;
            let item = Catalog::builtin()
                .get(&item)
                .cloned()
                .with_context(|| format!("Unknown item '{}'", item))?;

            let snapshots = if simulate {
                simulate_card(&config, &progress, item)?
            } else {
                play_card_live(&config, &progress, item).await
            };

            for snapshot in snapshots {
                progress.record_snapshot(snapshot);
            }
            store.save(&progress)?;
        }
        Some(Commands::Evaluate { learner }) => {
            let config = Config::load()?;
            let store = ProgressStore::new()?;
            let Some(mut progress) = store.load(&learner)? else {
                bail!("No stored progress for '{}'", learner);
            };

            let window = progress.recent_window(config.adaptation.window_size).to_vec();
            match WindowMetrics::compute(&window) {
                Some(metrics) => {
                    println!("Window: {} snapshot(s)", metrics.total);
                    println!("Repeat rate: {:.2}", metrics.repeat_rate);
                    match metrics.completion_speed {
                        Some(speed) => println!("Throughput: {:.2}/min", speed),
                        None => println!("Throughput: n/a"),
                    }
                }
                None => println!("Not enough snapshots to adapt yet."),
            }

            let thresholds = AdaptationThresholds::from(&config.adaptation);
            let overrides = evaluate(&progress.effective_rules(), &window, &thresholds);
            if overrides.is_empty() {
                println!("No changes.");
            } else {
                let json = serde_json::to_string_pretty(&overrides).context("Failed to serialize overrides")?;
                println!("Applying overrides:\n{}", json);
                progress.merge_overrides(&overrides);
                store.save(&progress)?;
            }
        }
        Some(Commands::Config { show, reset }) => {
            if reset {
                config::reset_config()?;
            } else if show {
                config::show_config()?;
            } else {
                println!("Config file: {}", config::config_path()?.display());
                println!();
                println!("Configuration options:");
                println!("  --show    Display current configuration");
                println!("  --reset   Restore defaults");
            }
        }
    }

    Ok(())
}

/// Load or create a learner, storing any profile/age given on the command line
fn open_learner(
    store: &ProgressStore,
    config: &Config,
    learner: &str,
    profile: Option<String>,
    age: Option<u8>,
) -> Result<LearnerProgress> {
    let profile_key = profile.clone().unwrap_or_else(|| Profile::Other.key().to_string());
    let mut progress =
        store.load_or_create(learner, &profile_key, age.unwrap_or(config.session.default_age))?;

    let mut changed = !store.exists(learner);
    if let Some(key) = profile {
        let key = Profile::resolve(&key).key().to_string();
        if progress.profile != key {
            progress.profile = key;
            changed = true;
        }
    }
    if let Some(age) = age {
        if progress.age != age {
            progress.age = age;
            changed = true;
        }
    }
    if changed {
        store.save(&progress)?;
    }
    Ok(progress)
}

fn simulate_card(
    config: &Config,
    progress: &LearnerProgress,
    item: CurriculumItem,
) -> Result<Vec<crate::adaptation::PerformanceSnapshot>> {
    let mut player = SequencePlayer::new(VirtualHost::new(), progress.profile(), item)
        .with_rules(progress.effective_rules())
        .with_settings(config.player.clone());

    player.start();
    if !player.run_to_end(256) {
        bail!("Card did not reach the end of its sequence");
    }

    for (at, event) in player.host().events() {
        println!("[{:>6.2}s] {}", at.as_secs_f64(), describe_event(event));
    }

    let snapshot = player.finish().context("Card was not finished")?;
    println!("Finished '{}' in {:.1}s", snapshot.item_id, player.host().elapsed().as_secs_f64());
    Ok(vec![snapshot])
}

async fn play_card_live(
    config: &Config,
    progress: &LearnerProgress,
    item: CurriculumItem,
) -> Vec<crate::adaptation::PerformanceSnapshot> {
    println!("Enter = tap, r = repeat, f = finish, q = quit");

    let (tx, mut rx) = card_channel();
    spawn_input_reader(std::io::BufReader::new(std::io::stdin()), tx.clone());
    let host = TokioHost::new(ConsolePresenter, tx);
    let mut player = SequencePlayer::new(host, progress.profile(), item)
        .with_rules(progress.effective_rules())
        .with_settings(config.player.clone());

    let outcome = play_card(&mut player, &mut rx).await;

    if !outcome.completed {
        println!("Card left before finishing.");
    }
    outcome.snapshots
}

/// Map one input line to a card event
fn parse_input(line: &str) -> Option<CardEvent> {
    match line.trim() {
        "" => Some(CardEvent::Tap),
        "r" => Some(CardEvent::Repeat),
        "f" => Some(CardEvent::Finish),
        "q" => Some(CardEvent::Quit),
        _ => None,
    }
}

/// Forward input lines to the card loop from a detached OS thread; the
/// blocking read must not keep the runtime alive once the card ends.
/// EOF quits.
fn spawn_input_reader<R>(reader: R, events: CardSender)
where
    R: BufRead + Send + 'static,
{
    std::thread::spawn(move || {
        for line in reader.lines() {
            let Ok(line) = line else {
                break;
            };
            let Some(event) = parse_input(&line) else {
                println!("Unknown input '{}'", line.trim());
                continue;
            };
            if events.send(event).is_err() {
                return;
            }
        }
        let _ = events.send(CardEvent::Quit);
    });
}

/// Prints presentation effects as they happen
struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn narrate(&mut self, text: &str, locale: Locale) {
        println!("  🔊 \"{}\" ({})", text, locale.as_tag());
    }

    fn stop_narration(&mut self) {
        println!("  🔇");
    }

    fn play_effect(&mut self, tag: &str) {
        println!("  🎵 {}", tag);
    }

    fn show(&mut self, visual: &Visual) {
        println!("  🖼  {}", describe_visual(visual));
    }

    fn on_step_change(&mut self, phase: Phase, index: usize, step: &Step) {
        println!("{} {}: {}", phase, index, describe_step(step));
    }

    fn on_finished(&mut self) {
        println!("Done! r = repeat, f = finish");
    }
}

fn describe_step(step: &Step) -> String {
    let mut text = format!("{} {}ms", step.kind, step.duration_ms);
    for (set, flag) in [
        (step.silent, "silent"),
        (step.auto_advance, "auto"),
        (step.wait_for_tap, "wait-for-tap"),
        (step.blur, "blur"),
        (step.enthusiastic, "enthusiastic"),
    ] {
        if set {
            text.push(' ');
            text.push_str(flag);
        }
    }
    text
}

fn describe_visual(visual: &Visual) -> String {
    match visual {
        Visual::Glyph(glyph) => glyph.clone(),
        Visual::ContextImage { image, blurred: true } => format!("{} (blurred)", image),
        Visual::ContextImage { image, blurred: false } => image.clone(),
        Visual::ClearBlur => "unblur".to_string(),
        Visual::Celebration => "celebration".to_string(),
    }
}

fn describe_event(event: &HostEvent) -> String {
    match event {
        HostEvent::Narrated { text, .. } => format!("narrate \"{}\"", text),
        HostEvent::NarrationStopped => "stop narration".to_string(),
        HostEvent::Effect(tag) => format!("effect {}", tag),
        HostEvent::Shown(visual) => format!("show {}", describe_visual(visual)),
        HostEvent::StepChanged { phase, index, kind } => format!("{} {} ({})", phase, index, kind),
        HostEvent::Finished => "finished".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    /// Reader whose `read` blocks until the gate's sender is dropped
    struct Gate(mpsc::Receiver<()>);

    impl Read for Gate {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            let _ = self.0.recv();
            Ok(0)
        }
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input(""), Some(CardEvent::Tap));
        assert_eq!(parse_input("  "), Some(CardEvent::Tap));
        assert_eq!(parse_input("r"), Some(CardEvent::Repeat));
        assert_eq!(parse_input(" f "), Some(CardEvent::Finish));
        assert_eq!(parse_input("q"), Some(CardEvent::Quit));
        assert_eq!(parse_input("x"), None);
    }

    #[tokio::test]
    async fn test_reader_forwards_lines_then_quits_on_eof() {
        let (tx, mut rx) = card_channel();
        spawn_input_reader(Cursor::new("\nr\nhello\nf\n"), tx);

        let mut received = Vec::new();
        while let Some(event) = rx.recv().await {
            received.push(event);
        }
        assert_eq!(
            received,
            vec![CardEvent::Tap, CardEvent::Repeat, CardEvent::Finish, CardEvent::Quit]
        );
    }

    #[test]
    fn test_blocked_reader_does_not_hold_runtime_open() {
        let (release, gate) = mpsc::channel::<()>();
        let started = Instant::now();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let (tx, mut rx) = card_channel();
            spawn_input_reader(std::io::BufReader::new(Gate(gate)), tx.clone());
            tx.send(CardEvent::Finish).unwrap();
            assert_eq!(rx.recv().await, Some(CardEvent::Finish));
        });
        drop(runtime);
        assert!(started.elapsed() < Duration::from_secs(1));

        drop(release);
    }
}
