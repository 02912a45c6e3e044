pub mod catalog;
pub mod config;
pub mod session;
pub mod simulate;

use mindguard_core::{Event, ProgressTracker};

/// One human-readable line per event.
pub fn describe(event: &Event) -> String {
    let detail = match event {
        Event::ScrollSpanClosed {
            duration_ms,
            exceeded_threshold,
            ..
        } => {
            let flag = if *exceeded_threshold {
                " (over threshold)"
            } else {
                ""
            };
            format!("scroll span closed after {duration_ms} ms{flag}")
        }
        Event::InterventionShown {
            message, source, ..
        } => format!("intervention [{}]: {message}", source.as_str()),
        Event::InterventionHidden { reason, .. } => {
            format!("intervention hidden ({})", reason.as_str())
        }
        Event::BreakSuggested {
            break_id,
            break_type,
            ..
        } => format!(
            "break #{break_id} suggested: {} ({} s), {}",
            break_type.name, break_type.duration_secs, break_type.instruction
        ),
        Event::BreakStarted {
            break_id,
            duration_secs,
            ..
        } => format!("break #{break_id} started ({duration_secs} s)"),
        Event::BreakTick {
            break_id,
            remaining_secs,
            ..
        } => format!("break #{break_id}: {remaining_secs} s left"),
        Event::BreakCompleted { break_id, .. } => format!("break #{break_id} completed"),
        Event::BreakSkipped {
            break_id,
            next_suggestion_in_ms,
            ..
        } => format!(
            "break #{break_id} skipped, next suggestion in {} s",
            next_suggestion_in_ms / 1_000
        ),
        Event::FeedRefreshed { items, .. } => {
            let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
            format!("feed refreshed: {}", titles.join(" | "))
        }
        Event::DashboardRevealed { .. } => "progress dashboard revealed".to_string(),
        Event::ChallengeWidgetRevealed { .. } => "community challenge revealed".to_string(),
        Event::ActivityStarted { kind, .. } => format!("{} started", kind.as_str()),
        Event::ChallengeTick { remaining_secs, .. } => {
            format!("challenge: {}:{:02} left", remaining_secs / 60, remaining_secs % 60)
        }
        Event::BreathPhase { breath, step, .. } => {
            format!("breath {breath}: {}", step.as_str())
        }
        Event::ActivityCompleted { kind, .. } => format!("{} completed", kind.as_str()),
    };
    format!("[{:>9.3}s] {detail}", event.at() as f64 / 1_000.0)
}

pub fn print_event(event: &Event, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string(event)?);
    } else {
        println!("{}", describe(event));
    }
    Ok(())
}

pub fn print_summary(tracker: &ProgressTracker, json: bool) -> Result<(), serde_json::Error> {
    let stats = tracker.stats();
    if json {
        let summary = serde_json::json!({
            "type": "Summary",
            "level": tracker.level(),
            "stats": stats,
        });
        println!("{summary}");
        return Ok(());
    }

    println!("--- progress ---");
    println!(
        "level {} ({:.0}% to next), {} XP",
        tracker.level(),
        tracker.level_progress() * 100.0,
        stats.xp
    );
    println!(
        "interventions: {} shown, {} accepted, {} dismissed, {} timed out",
        stats.interventions_shown,
        stats.interventions_accepted,
        stats.interventions_dismissed,
        stats.interventions_timed_out
    );
    println!(
        "breaks: {} suggested, {} taken, {} skipped",
        stats.breaks_suggested, stats.breaks_taken, stats.breaks_skipped
    );
    println!(
        "activities: {} challenges, {} mindful moments, streak {}",
        stats.challenges_completed, stats.mindful_moments, stats.streak
    );
    println!("feed refreshes: {}", stats.feed_refreshes);
    Ok(())
}
