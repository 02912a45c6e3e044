//! Interactive session on the wall clock.
//!
//! The scheduler lives on one tokio task. Stdin lines arrive over a channel
//! and a 100 ms ticker runs due timers.

use std::str::FromStr;
use std::time::Duration;

use clap::Args;
use mindguard_core::{
    BreakId, Catalog, Config, InterventionSource, NotificationScheduler, ProgressTracker,
    SeededRandom, SystemClock,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{print_event, print_summary};

const TICK: Duration = Duration::from_millis(100);

const HELP: &str = "commands: scroll, trigger, accept, dismiss, start <id>, skip <id>, \
challenge, breathe, feed, stats, help, quit";

#[derive(Args)]
pub struct SessionArgs {
    /// Seed for break and feed selection
    #[arg(long)]
    seed: Option<u64>,
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionCommand {
    Scroll,
    Trigger,
    Accept,
    Dismiss,
    Start(BreakId),
    Skip(BreakId),
    Challenge,
    Breathe,
    Feed,
    Stats,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let mut break_id = || -> Result<BreakId, String> {
            let raw = parts
                .next()
                .ok_or_else(|| format!("'{name}' needs a break id"))?;
            raw.parse()
                .map_err(|_| format!("invalid break id: {raw}"))
        };
        match name {
            "scroll" | "s" => Ok(Self::Scroll),
            "trigger" => Ok(Self::Trigger),
            "accept" => Ok(Self::Accept),
            "dismiss" => Ok(Self::Dismiss),
            "start" => Ok(Self::Start(break_id()?)),
            "skip" => Ok(Self::Skip(break_id()?)),
            "challenge" => Ok(Self::Challenge),
            "breathe" => Ok(Self::Breathe),
            "feed" => Ok(Self::Feed),
            "stats" => Ok(Self::Stats),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

type WallScheduler = NotificationScheduler<SystemClock, SeededRandom>;

pub fn run(args: SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let seed = args.seed.or(config.simulation.seed);
    let scheduler = NotificationScheduler::new(
        config.scheduler,
        Catalog::default(),
        SystemClock::new(),
        SeededRandom::new(seed),
    )?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = rt.block_on(drive(scheduler, args.json));
    // The stdin reader may still be parked on a blocking read.
    rt.shutdown_background();
    result
}

async fn drive(
    mut scheduler: WallScheduler,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, mut rx) = mpsc::channel::<String>(32);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    warn!(error = %err, "failed to read stdin");
                    break;
                }
            }
        }
    });

    let mut tracker = ProgressTracker::new();
    let mut ticker = tokio::time::interval(TICK);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    eprintln!("{HELP}");
    scheduler.start()?;
    flush(&mut scheduler, &mut tracker, json)?;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                scheduler.run_pending();
            }
            line = rx.recv() => {
                let Some(line) = line else {
                    debug!("stdin closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<SessionCommand>() {
                    Ok(SessionCommand::Quit) => break,
                    Ok(command) => apply(&mut scheduler, &tracker, command, json)?,
                    Err(message) => eprintln!("{message}"),
                }
            }
            _ = &mut ctrl_c => {
                debug!("interrupted");
                break;
            }
        }
        flush(&mut scheduler, &mut tracker, json)?;
    }

    let cancelled = scheduler.shutdown();
    flush(&mut scheduler, &mut tracker, json)?;
    eprintln!("session ended, {cancelled} pending timers cancelled");
    print_summary(&tracker, json)?;
    Ok(())
}

fn apply(
    scheduler: &mut WallScheduler,
    tracker: &ProgressTracker,
    command: SessionCommand,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let now = scheduler.now();
    let result = match command {
        SessionCommand::Scroll => {
            scheduler.report_scroll_event(now);
            Ok(())
        }
        SessionCommand::Trigger => scheduler
            .trigger_intervention(InterventionSource::Manual)
            .map(|shown| {
                if !shown {
                    eprintln!("an intervention is already showing");
                }
            }),
        SessionCommand::Accept => scheduler.accept_intervention(),
        SessionCommand::Dismiss => scheduler.dismiss_intervention(),
        SessionCommand::Start(id) => scheduler.start_break(id),
        SessionCommand::Skip(id) => scheduler.skip_break(id),
        SessionCommand::Challenge => scheduler.start_challenge(),
        SessionCommand::Breathe => scheduler.start_mindful_breathing(),
        SessionCommand::Feed => scheduler.refresh_feed_now(),
        SessionCommand::Stats => return Ok(print_summary(tracker, json)?),
        SessionCommand::Help => {
            eprintln!("{HELP}");
            Ok(())
        }
        SessionCommand::Quit => Ok(()),
    };
    // User mistakes are reported, not fatal.
    if let Err(err) = result {
        eprintln!("{err}");
    }
    Ok(())
}

fn flush(
    scheduler: &mut WallScheduler,
    tracker: &mut ProgressTracker,
    json: bool,
) -> Result<(), serde_json::Error> {
    for event in scheduler.drain_events() {
        print_event(&event, json)?;
        tracker.apply(&event);
    }
    Ok(())
}
