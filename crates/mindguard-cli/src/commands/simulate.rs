//! Deterministic run on a virtual clock.

use clap::Args;
use mindguard_core::{
    ActivityKind, Catalog, Config, Event, ManualClock, Millis, NotificationScheduler,
    ProgressTracker, SchedulerError, SeededRandom,
};
use tracing::debug;

use super::{print_event, print_summary};

/// Virtual time between simulated scroll events.
const STEP_MS: Millis = 200;

#[derive(Args)]
pub struct SimulateArgs {
    /// Seed for break and feed selection (defaults to the configured seed, then entropy)
    #[arg(long)]
    seed: Option<u64>,
    /// Scroll continuously for this many seconds from t=0
    #[arg(long, default_value = "0")]
    scroll_secs: u64,
    /// Total virtual time to simulate
    #[arg(long, default_value = "30")]
    minutes: u64,
    /// Accept every intervention as soon as it shows
    #[arg(long)]
    accept: bool,
    /// After each accept, run the challenge and the breathing exercise
    #[arg(long, requires = "accept")]
    activities: bool,
    /// Start every suggested break immediately
    #[arg(long)]
    take_breaks: bool,
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let seed = args.seed.or(config.simulation.seed);
    let mut scheduler = NotificationScheduler::new(
        config.scheduler,
        Catalog::default(),
        ManualClock::new(),
        SeededRandom::new(seed),
    )?;
    let mut tracker = ProgressTracker::new();

    let end = args.minutes.saturating_mul(60_000);
    let scroll_end = args.scroll_secs.saturating_mul(1_000);
    debug!(?seed, end, scroll_end, "simulation starting");

    scheduler.start()?;
    let mut t: Millis = 0;
    loop {
        if args.scroll_secs > 0 && t <= scroll_end {
            scheduler.report_scroll_event(t);
        } else {
            scheduler.advance_to(t);
        }

        for event in scheduler.drain_events() {
            print_event(&event, args.json)?;
            tracker.apply(&event);
            match event {
                Event::InterventionShown { .. }
                    if args.accept && scheduler.current_message().is_some() =>
                {
                    scheduler.accept_intervention()?;
                    if args.activities {
                        start_idle_activities(&mut scheduler)?;
                    }
                }
                Event::BreakSuggested { break_id, .. } if args.take_breaks => {
                    scheduler.start_break(break_id)?;
                }
                _ => {}
            }
        }
        // Reactions above may have emitted more at the same instant.
        for event in scheduler.drain_events() {
            print_event(&event, args.json)?;
            tracker.apply(&event);
        }

        if t >= end {
            break;
        }
        t = (t + STEP_MS).min(end);
    }

    scheduler.shutdown();
    Ok(print_summary(&tracker, args.json)?)
}

/// Start whichever activities are not already running.
fn start_idle_activities(
    scheduler: &mut NotificationScheduler<ManualClock, SeededRandom>,
) -> Result<(), SchedulerError> {
    if !scheduler.activities().is_running(ActivityKind::Challenge) {
        scheduler.start_challenge()?;
    }
    if !scheduler.activities().is_running(ActivityKind::Mindful) {
        scheduler.start_mindful_breathing()?;
    }
    Ok(())
}
