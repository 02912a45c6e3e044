//! Integration tests for progress tracking over a simulated session.

use mindguard_core::{
    Catalog, InterventionSource, ManualClock, NotificationScheduler, ProgressTracker,
    SchedulerConfig, SequenceRandom,
};

#[test]
fn simulated_session_rewards_accepts_and_completed_breaks() {
    let mut s = NotificationScheduler::new(
        SchedulerConfig::default(),
        Catalog::default(),
        ManualClock::new(),
        SequenceRandom::new(vec![1]),
    )
    .unwrap();
    let mut tracker = ProgressTracker::new();

    s.start().unwrap();

    // demo intervention at 30 s, accepted
    s.advance_by(30_000);
    s.accept_intervention().unwrap();

    // scroll-triggered intervention, ignored until it times out
    for t in (31_000..=45_000).step_by(200) {
        s.report_scroll_event(t);
    }
    s.advance_by(20_000);

    // first break at 25 min, taken
    s.advance_to(1_500_000);
    let break_id = s.active_breaks().next().unwrap().id;
    s.start_break(break_id).unwrap();
    s.advance_by(120_000);

    tracker.apply_all(&s.drain_events());
    let stats = tracker.stats();
    assert_eq!(stats.interventions_shown, 2);
    assert_eq!(stats.interventions_accepted, 1);
    assert_eq!(stats.interventions_timed_out, 1);
    assert_eq!(stats.breaks_suggested, 1);
    assert_eq!(stats.breaks_taken, 1);
    // initial draw plus one every 5 minutes up to 27 min
    assert_eq!(stats.feed_refreshes, 6);
    assert_eq!(tracker.xp(), 20);
}

#[test]
fn manual_triggers_count_as_shown() {
    let mut s = NotificationScheduler::simulated(SchedulerConfig::default(), 9).unwrap();
    let mut tracker = ProgressTracker::with_xp(990);
    s.trigger_intervention(InterventionSource::Manual).unwrap();
    s.accept_intervention().unwrap();
    for event in s.drain_events() {
        tracker.apply(&event);
    }
    assert_eq!(tracker.level(), 2);
    assert_eq!(tracker.stats().interventions_shown, 1);
}
