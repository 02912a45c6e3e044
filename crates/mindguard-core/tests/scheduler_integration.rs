//! Integration tests for the notification scheduler.
//!
//! Every scenario runs on a virtual clock with a scripted random source, so
//! event timestamps are exact.

use mindguard_core::{
    BreakId, BreakStatus, Catalog, Clock, Event, HideReason, InterventionSource,
    InterventionState, ManualClock, NotificationScheduler, SchedulerConfig, SequenceRandom,
};

type Scheduler = NotificationScheduler<ManualClock, SequenceRandom>;

fn scheduler_with(config: SchedulerConfig) -> Scheduler {
    NotificationScheduler::new(
        config,
        Catalog::default(),
        ManualClock::new(),
        SequenceRandom::new(vec![2, 0, 3, 1]),
    )
    .unwrap()
}

fn scheduler() -> Scheduler {
    scheduler_with(SchedulerConfig::default())
}

fn shown_messages(events: &[Event]) -> Vec<(String, u64)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::InterventionShown { message, at, .. } => Some((message.clone(), *at)),
            _ => None,
        })
        .collect()
}

fn closed_spans(events: &[Event]) -> Vec<(u64, u64, u64)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::ScrollSpanClosed {
                started_at,
                duration_ms,
                at,
                ..
            } => Some((*started_at, *duration_ms, *at)),
            _ => None,
        })
        .collect()
}

fn suggested_breaks(events: &[Event]) -> Vec<(BreakId, u64)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::BreakSuggested { break_id, at, .. } => Some((*break_id, *at)),
            _ => None,
        })
        .collect()
}

/// Scroll continuously from `from` to `to` (inclusive) every `step` ms.
fn scroll(s: &mut Scheduler, from: u64, to: u64, step: u64) {
    let mut t = from;
    while t <= to {
        s.report_scroll_event(t);
        t += step;
    }
}

#[test]
fn events_within_debounce_window_form_one_span() {
    let mut s = scheduler();
    for t in [0, 400, 1_200, 1_900, 2_300] {
        s.report_scroll_event(t);
    }
    s.advance_by(5_000);

    assert_eq!(closed_spans(s.events()), vec![(0, 2_300, 3_300)]);
    assert_eq!(s.scroll_spans_closed(), 1);
    assert!(shown_messages(s.events()).is_empty());
}

#[test]
fn gap_longer_than_window_splits_spans() {
    // t=0, t=500, t=11500
    let mut s = scheduler();
    s.report_scroll_event(0);
    s.report_scroll_event(500);
    s.report_scroll_event(11_500);

    assert_eq!(closed_spans(s.events()), vec![(0, 500, 1_500)]);
    assert!(shown_messages(s.events()).is_empty());

    let open = s.open_scroll_span().copied().unwrap();
    assert_eq!(open.started_at, 11_500);
    assert_eq!(open.last_seen_at, 11_500);
}

#[test]
fn long_scroll_triggers_one_intervention_at_span_close() {
    // every 200 ms from 0 to 12000, then silence
    let mut s = scheduler();
    scroll(&mut s, 0, 12_000, 200);
    s.advance_by(2_000);

    assert_eq!(closed_spans(s.events()), vec![(0, 12_000, 13_000)]);
    let shown = shown_messages(s.events());
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].1, 13_000);
    assert!(matches!(
        s.events().last(),
        Some(Event::InterventionShown {
            source: InterventionSource::Scroll,
            ..
        })
    ));
    assert_eq!(s.intervention_state(), InterventionState::Showing);
}

#[test]
fn span_exactly_at_threshold_does_not_trigger() {
    let mut s = scheduler();
    scroll(&mut s, 0, 10_000, 500);
    s.advance_by(1_000);
    assert_eq!(closed_spans(s.events()), vec![(0, 10_000, 11_000)]);
    assert!(shown_messages(s.events()).is_empty());
}

#[test]
fn long_scroll_while_showing_adds_nothing() {
    // long auto-dismiss so the intervention is still up when the span closes
    let mut s = scheduler_with(SchedulerConfig {
        auto_dismiss_ms: 60_000,
        ..SchedulerConfig::default()
    });
    s.trigger_intervention(InterventionSource::Manual).unwrap();
    s.drain_events();

    scroll(&mut s, 0, 12_000, 200);
    s.advance_by(2_000);

    let events = s.drain_events();
    assert_eq!(closed_spans(&events).len(), 1);
    assert!(shown_messages(&events).is_empty());
    assert_eq!(s.intervention_state(), InterventionState::Showing);
}

#[test]
fn accept_cancels_auto_dismiss() {
    let mut s = scheduler();
    s.trigger_intervention(InterventionSource::Manual).unwrap();
    s.advance_by(3_000);
    s.accept_intervention().unwrap();
    assert_eq!(s.clock().pending(), 0);

    s.advance_by(20_000);
    let hidden: Vec<_> = s
        .events()
        .iter()
        .filter_map(|e| match e {
            Event::InterventionHidden { reason, at } => Some((*reason, *at)),
            _ => None,
        })
        .collect();
    assert_eq!(hidden, vec![(HideReason::Accepted, 3_000)]);
}

#[test]
fn dismiss_cancels_auto_dismiss_and_is_idempotent() {
    let mut s = scheduler();
    s.trigger_intervention(InterventionSource::Manual).unwrap();
    s.dismiss_intervention().unwrap();
    s.dismiss_intervention().unwrap();
    s.advance_by(30_000);

    let hidden = s
        .events()
        .iter()
        .filter(|e| matches!(e, Event::InterventionHidden { .. }))
        .count();
    assert_eq!(hidden, 1);
    assert_eq!(s.intervention_state(), InterventionState::Idle);
}

#[test]
fn new_intervention_after_accept_gets_fresh_timeout() {
    let mut s = scheduler();
    s.trigger_intervention(InterventionSource::Manual).unwrap();
    s.advance_by(9_000);
    s.accept_intervention().unwrap();
    s.trigger_intervention(InterventionSource::Manual).unwrap();

    // the first timeout would have been at 10 s
    s.advance_by(5_000);
    assert_eq!(s.intervention_state(), InterventionState::Showing);
    s.advance_by(5_000);
    assert_eq!(s.intervention_state(), InterventionState::Idle);
}

#[test]
fn rotation_repeats_after_full_cycle() {
    let mut s = scheduler();
    for _ in 0..6 {
        s.trigger_intervention(InterventionSource::Manual).unwrap();
        s.dismiss_intervention().unwrap();
    }
    let shown = shown_messages(s.events());
    let messages = Catalog::default_messages();
    assert_eq!(shown.len(), 6);
    for (i, (message, _)) in shown.iter().take(5).enumerate() {
        assert_eq!(message, &messages[i]);
    }
    assert_eq!(shown[5].0, shown[0].0);
}

#[test]
fn dropped_trigger_does_not_advance_rotation() {
    let mut s = scheduler();
    s.trigger_intervention(InterventionSource::Manual).unwrap();
    s.trigger_intervention(InterventionSource::Demo).unwrap();
    s.accept_intervention().unwrap();
    assert_eq!(s.next_message(), Catalog::default_messages()[1]);
}

#[test]
fn demo_trigger_fires_once_after_delay() {
    let mut s = scheduler();
    s.start_demo_timer().unwrap();
    s.advance_by(29_999);
    assert!(shown_messages(s.events()).is_empty());
    s.advance_by(1);
    assert_eq!(shown_messages(s.events()).len(), 1);

    s.accept_intervention().unwrap();
    s.advance_by(120_000);
    assert_eq!(shown_messages(s.events()).len(), 1);
}

#[test]
fn demo_trigger_dropped_while_showing() {
    let mut s = scheduler();
    s.start_auto_intervention_after(5_000).unwrap();
    s.trigger_intervention(InterventionSource::Manual).unwrap();
    s.advance_by(6_000);
    assert_eq!(shown_messages(s.events()).len(), 1);
}

#[test]
fn breaks_are_suggested_every_interval() {
    let mut s = scheduler();
    s.schedule_breaks(1_500_000).unwrap();
    s.advance_by(3 * 1_500_000);

    let suggested = suggested_breaks(s.events());
    let times: Vec<_> = suggested.iter().map(|(_, at)| *at).collect();
    assert_eq!(times, vec![1_500_000, 3_000_000, 4_500_000]);

    // scripted picks 2, 0, 3 -> Hydration, Eye Rest, Deep Breathing
    let names: Vec<_> = s
        .events()
        .iter()
        .filter_map(|e| match e {
            Event::BreakSuggested { break_type, .. } => Some(break_type.name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["Hydration", "Eye Rest", "Deep Breathing"]);
}

#[test]
fn breaks_coexist_with_interventions() {
    let mut s = scheduler_with(SchedulerConfig {
        auto_dismiss_ms: 10_000_000,
        ..SchedulerConfig::default()
    });
    s.trigger_intervention(InterventionSource::Manual).unwrap();
    s.schedule_breaks(60_000).unwrap();
    s.advance_by(120_000);

    assert_eq!(suggested_breaks(s.events()).len(), 2);
    assert_eq!(s.active_breaks().count(), 2);
    assert_eq!(s.intervention_state(), InterventionState::Showing);
}

#[test]
fn skip_rearms_after_short_interval() {
    let mut s = scheduler();
    s.schedule_breaks(1_500_000).unwrap();
    s.advance_by(1_500_000);
    let (id, _) = suggested_breaks(s.events())[0];
    s.drain_events();

    s.advance_by(60_000);
    s.skip_break(id).unwrap();
    assert_eq!(s.break_suggestion(id).unwrap().status, BreakStatus::Skipped);
    assert!(matches!(
        s.events().last(),
        Some(Event::BreakSkipped {
            next_suggestion_in_ms: 300_000,
            ..
        })
    ));

    s.advance_by(299_999);
    assert!(suggested_breaks(s.events()).is_empty());
    s.advance_by(1);
    assert_eq!(suggested_breaks(s.events()).len(), 1);
    assert_eq!(suggested_breaks(s.events())[0].1, 1_860_000);
}

#[test]
fn skip_resets_the_break_period() {
    let mut s = scheduler();
    s.schedule_breaks(1_500_000).unwrap();
    s.advance_by(1_500_000);
    let (id, _) = suggested_breaks(s.events())[0];
    s.drain_events();

    // skip at 1_500_000; re-suggest at 1_800_000; next regular 25 min later
    s.skip_break(id).unwrap();
    s.advance_by(1_500_000 + 300_000);
    let times: Vec<_> = suggested_breaks(s.events()).iter().map(|(_, at)| *at).collect();
    assert_eq!(times, vec![1_800_000, 3_300_000]);
}

#[test]
fn skipping_running_break_stops_countdown() {
    let mut s = scheduler();
    s.schedule_breaks(1_000).unwrap();
    s.advance_by(1_000);
    let (id, _) = suggested_breaks(s.events())[0];
    s.schedule_breaks(10_000_000).unwrap();

    s.start_break(id).unwrap();
    s.advance_by(3_000);
    s.skip_break(id).unwrap();
    s.drain_events();

    s.advance_by(60_000);
    assert!(!s
        .events()
        .iter()
        .any(|e| matches!(e, Event::BreakTick { .. } | Event::BreakCompleted { .. })));
    assert!(matches!(
        s.skip_break(id),
        Err(mindguard_core::SchedulerError::InvalidStateTransition { .. })
    ));
}

#[test]
fn break_countdown_reports_every_second() {
    let mut s = scheduler();
    s.schedule_breaks(1_000).unwrap();
    s.advance_by(1_000);
    // first scripted pick is 2 -> Hydration, 15 s
    let (id, _) = suggested_breaks(s.events())[0];
    s.schedule_breaks(10_000_000).unwrap();
    s.drain_events();

    s.start_break(id).unwrap();
    s.advance_by(20_000);
    let events = s.drain_events();

    assert_eq!(
        events[0],
        Event::BreakStarted {
            break_id: id,
            duration_secs: 15,
            at: 1_000
        }
    );
    let ticks: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            Event::BreakTick { remaining_secs, .. } => Some(*remaining_secs),
            _ => None,
        })
        .collect();
    assert_eq!(ticks, (0..15).rev().collect::<Vec<u32>>());
    assert_eq!(
        events.last(),
        Some(&Event::BreakCompleted {
            break_id: id,
            at: 16_000
        })
    );
}

#[test]
fn feed_refresh_draws_distinct_items() {
    let mut s = scheduler();
    s.schedule_feed_refresh(300_000).unwrap();
    s.advance_by(900_000);

    let draws: Vec<_> = s
        .events()
        .iter()
        .filter_map(|e| match e {
            Event::FeedRefreshed { items, at } => Some((items.clone(), *at)),
            _ => None,
        })
        .collect();
    assert_eq!(draws.len(), 3);
    for (items, _) in &draws {
        assert_eq!(items.len(), 3);
        for (i, a) in items.iter().enumerate() {
            assert!(items.iter().skip(i + 1).all(|b| a.title != b.title));
        }
    }
    assert_eq!(draws[2].1, 900_000);
}

#[test]
fn start_arms_everything_from_config() {
    let mut s = scheduler();
    s.start().unwrap();
    assert!(matches!(
        s.events().first(),
        Some(Event::FeedRefreshed { at: 0, .. })
    ));

    s.advance_by(30_000);
    let names: Vec<_> = s.events().iter().map(Event::name).collect();
    assert_eq!(
        names,
        vec![
            "feed_refreshed",
            "challenge_widget_revealed",
            "dashboard_revealed",
            "intervention_shown",
        ]
    );
    assert!(matches!(
        s.events()[1],
        Event::ChallengeWidgetRevealed { at: 5_000 }
    ));
    assert!(matches!(
        s.events()[2],
        Event::DashboardRevealed { at: 10_000 }
    ));
}

#[test]
fn shutdown_silences_everything() {
    let mut s = scheduler();
    s.start().unwrap();
    s.report_scroll_event(100);
    s.trigger_intervention(InterventionSource::Manual).unwrap();
    s.advance_by(1_500_000);
    let (id, _) = suggested_breaks(s.events())[0];
    s.start_break(id).unwrap();
    s.drain_events();

    let cancelled = s.shutdown();
    assert!(cancelled >= 3);
    assert_eq!(s.clock().pending(), 0);

    s.report_scroll_event(1_600_000);
    s.advance_by(10 * 1_500_000);
    assert!(s.drain_events().is_empty());
    assert!(s.is_shut_down());
}

#[test]
fn concurrent_break_countdowns_are_independent() {
    let mut s = scheduler();
    s.schedule_breaks(1_000).unwrap();
    s.advance_by(2_000);
    let suggested = suggested_breaks(s.events());
    let (first, second) = (suggested[0].0, suggested[1].0);
    s.schedule_breaks(10_000_000).unwrap();

    s.start_break(first).unwrap();
    s.start_break(second).unwrap();
    s.skip_break(first).unwrap();
    s.advance_by(120_000);

    assert_eq!(
        s.break_suggestion(second).unwrap().status,
        BreakStatus::Completed
    );
    assert_eq!(
        s.break_suggestion(first).unwrap().status,
        BreakStatus::Skipped
    );
}
