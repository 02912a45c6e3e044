//! Integration tests for the challenge countdown, mindful breathing and the
//! community challenge widget.

use mindguard_core::{
    ActivityKind, BreathStep, Event, InterventionSource, ManualClock, NotificationScheduler,
    ProgressTracker, SchedulerConfig, SchedulerError, SeededRandom,
};

fn scheduler() -> NotificationScheduler<ManualClock, SeededRandom> {
    NotificationScheduler::simulated(SchedulerConfig::default(), 11).unwrap()
}

fn breath_phases(events: &[Event]) -> Vec<(u32, BreathStep, u64)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::BreathPhase { breath, step, at } => Some((*breath, *step, *at)),
            _ => None,
        })
        .collect()
}

#[test]
fn challenge_counts_down_two_minutes() {
    let mut s = scheduler();
    s.advance_to(4_000);
    s.start_challenge().unwrap();
    s.advance_by(119_000);
    assert!(s.activities().is_running(ActivityKind::Challenge));
    s.advance_by(1_000);

    let events = s.drain_events();
    let ticks: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            Event::ChallengeTick { remaining_secs, .. } => Some(*remaining_secs),
            _ => None,
        })
        .collect();
    assert_eq!(ticks.len(), 120);
    assert_eq!(ticks.first(), Some(&119));
    assert_eq!(ticks.last(), Some(&0));
    assert_eq!(
        events.last(),
        Some(&Event::ActivityCompleted {
            kind: ActivityKind::Challenge,
            at: 124_000
        })
    );
    assert!(!s.activities().is_running(ActivityKind::Challenge));
}

#[test]
fn breathing_runs_five_inhale_exhale_cycles() {
    let mut s = scheduler();
    s.start_mindful_breathing().unwrap();
    s.advance_by(30_000);

    let events = s.drain_events();
    let phases = breath_phases(&events);
    assert_eq!(phases.len(), 10);
    assert_eq!(phases[0], (1, BreathStep::Inhale, 0));
    assert_eq!(phases[1], (1, BreathStep::Exhale, 3_000));
    assert_eq!(phases[2], (2, BreathStep::Inhale, 5_000));
    assert_eq!(phases[9], (5, BreathStep::Exhale, 23_000));
    assert_eq!(
        events.last(),
        Some(&Event::ActivityCompleted {
            kind: ActivityKind::Mindful,
            at: 25_000
        })
    );
}

#[test]
fn a_running_activity_cannot_be_restarted() {
    let mut s = scheduler();
    s.start_mindful_breathing().unwrap();
    assert!(matches!(
        s.start_mindful_breathing(),
        Err(SchedulerError::InvalidStateTransition { .. })
    ));
    // the other kind runs alongside
    s.start_challenge().unwrap();

    s.advance_by(25_000);
    s.start_mindful_breathing().unwrap();
}

#[test]
fn challenge_widget_revealed_once_after_delay() {
    let mut s = scheduler();
    s.schedule_challenge_reveal(5_000).unwrap();
    s.advance_by(4_999);
    assert!(s.events().is_empty());
    s.advance_by(60_000);
    assert_eq!(s.drain_events(), vec![Event::ChallengeWidgetRevealed { at: 5_000 }]);
}

#[test]
fn rewards_after_accepted_intervention() {
    let mut s = scheduler();
    let mut tracker = ProgressTracker::new();

    s.trigger_intervention(InterventionSource::Manual).unwrap();
    s.accept_intervention().unwrap();
    s.start_challenge().unwrap();
    s.start_mindful_breathing().unwrap();
    s.advance_by(150_000);

    tracker.apply_all(&s.drain_events());
    let stats = tracker.stats();
    assert_eq!(tracker.xp(), 10 + 25 + 15);
    assert_eq!(stats.challenges_completed, 1);
    assert_eq!(stats.mindful_moments, 1);
    assert_eq!(stats.streak, 2);
}

#[test]
fn shutdown_stops_running_activities() {
    let mut s = scheduler();
    s.start_challenge().unwrap();
    s.start_mindful_breathing().unwrap();
    s.advance_by(2_000);
    s.drain_events();

    s.shutdown();
    s.advance_by(200_000);
    assert!(s.events().is_empty());
    assert!(!s.activities().is_running(ActivityKind::Mindful));
}
