//! Notification scheduler implementation.
//!
//! The scheduler is the single authority for "when does something appear on
//! screen". It owns every delayed and periodic trigger (interventions, break
//! suggestions, reward activities, feed refreshes, widget reveals), keeps the
//! one-intervention-at-a-time rule, and reports what changed as [`Event`]s.
//!
//! It has no internal threads. Time moves when the caller says so:
//!
//! ```ignore
//! let mut scheduler = NotificationScheduler::simulated(SchedulerConfig::default(), 42)?;
//! scheduler.start()?;
//! scheduler.report_scroll_event(0);
//! scheduler.advance_by(60_000);
//! for event in scheduler.drain_events() { /* render */ }
//! ```
//!
//! With a wall clock, call `run_pending()` on a short interval instead.

use tracing::{debug, info, trace, warn};

use super::activity::{Activities, ActivityKind, BreathStep, BreathingRun, ChallengeRun};
use super::breaks::{BreakBoard, BreakId, BreakStatus, BreakSuggestion};
use super::intervention::{
    HideReason, Intervention, InterventionSource, InterventionState, MessageRotation,
};
use super::scroll::{ScrollActivitySpan, ScrollTracker};
use crate::catalog::{Catalog, ContentItem};
use crate::clock::{Clock, Fired, ManualClock, Millis, Timer, TimerHandle};
use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::events::Event;
use crate::random::{RandomSource, SeededRandom};

pub struct NotificationScheduler<C: Clock, R: RandomSource> {
    config: SchedulerConfig,
    catalog: Catalog,
    clock: C,
    rng: R,
    scroll: ScrollTracker,
    debounce: Option<TimerHandle>,
    intervention: Intervention,
    demo_timer: Option<TimerHandle>,
    breaks: BreakBoard,
    /// Either the periodic break timer or the one-shot re-arm after a skip.
    break_timer: Option<TimerHandle>,
    /// Period restored after a skip re-arm fires. `None` until breaks are scheduled.
    break_interval_ms: Option<Millis>,
    feed_timer: Option<TimerHandle>,
    dashboard_timer: Option<TimerHandle>,
    challenge_reveal_timer: Option<TimerHandle>,
    activities: Activities,
    events: Vec<Event>,
    shut_down: bool,
}

impl NotificationScheduler<ManualClock, SeededRandom> {
    /// Virtual-clock scheduler with the default catalog and a seeded random source.
    pub fn simulated(config: SchedulerConfig, seed: u64) -> Result<Self, SchedulerError> {
        Self::new(
            config,
            Catalog::default(),
            ManualClock::new(),
            SeededRandom::from_seed(seed),
        )
    }
}

impl<C: Clock, R: RandomSource> NotificationScheduler<C, R> {
    pub fn new(
        config: SchedulerConfig,
        catalog: Catalog,
        clock: C,
        rng: R,
    ) -> Result<Self, SchedulerError> {
        config
            .validate()
            .map_err(|e| SchedulerError::InvalidConfig(e.to_string()))?;
        catalog.validate()?;
        let rotation = MessageRotation::new(catalog.messages.clone())?;
        Ok(Self {
            config,
            catalog,
            clock,
            rng,
            scroll: ScrollTracker::new(),
            debounce: None,
            intervention: Intervention::new(rotation),
            demo_timer: None,
            breaks: BreakBoard::new(),
            break_timer: None,
            break_interval_ms: None,
            feed_timer: None,
            dashboard_timer: None,
            challenge_reveal_timer: None,
            activities: Activities::new(),
            events: Vec::new(),
            shut_down: false,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn now(&self) -> Millis {
        self.clock.now()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn intervention_state(&self) -> InterventionState {
        self.intervention.state()
    }

    /// Message currently on screen, if an intervention is showing.
    pub fn current_message(&self) -> Option<&str> {
        self.intervention.message()
    }

    /// Message the next shown intervention will carry.
    pub fn next_message(&self) -> &str {
        self.intervention.rotation().peek()
    }

    pub fn open_scroll_span(&self) -> Option<&ScrollActivitySpan> {
        self.scroll.open_span()
    }

    pub fn last_scroll_span(&self) -> Option<&ScrollActivitySpan> {
        self.scroll.last_closed()
    }

    pub fn scroll_spans_closed(&self) -> u64 {
        self.scroll.closed_count()
    }

    pub fn break_suggestion(&self, id: BreakId) -> Option<&BreakSuggestion> {
        self.breaks.get(id)
    }

    /// Suggestions that are neither completed nor skipped.
    pub fn active_breaks(&self) -> impl Iterator<Item = &BreakSuggestion> {
        self.breaks.active()
    }

    /// Running challenge and breathing exercise, if any.
    pub fn activities(&self) -> &Activities {
        &self.activities
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Events emitted so far and not yet drained.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Take every emitted event, oldest first.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Page-load lifecycle: populate the feed once, then arm the demo
    /// trigger, the break and feed schedules and both widget reveals.
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        self.ensure_running()?;
        self.refresh_feed_now()?;
        self.start_demo_timer()?;
        self.schedule_breaks(self.config.break_interval_ms)?;
        self.schedule_feed_refresh(self.config.feed_refresh_interval_ms)?;
        self.schedule_dashboard_reveal(self.config.dashboard_reveal_delay_ms)?;
        self.schedule_challenge_reveal(self.config.challenge_reveal_delay_ms)?;
        info!(at = self.now(), "notification scheduler started");
        Ok(())
    }

    /// Cancel every outstanding timer. Returns how many were cancelled.
    ///
    /// A showing intervention is cleared without an event. Afterwards scroll
    /// events are ignored, operations return [`SchedulerError::ShutDown`]
    /// and no further events are emitted.
    pub fn shutdown(&mut self) -> usize {
        if self.shut_down {
            return 0;
        }
        let mut handles = vec![
            self.debounce.take(),
            self.intervention.take_auto_dismiss(),
            self.demo_timer.take(),
            self.break_timer.take(),
            self.feed_timer.take(),
            self.dashboard_timer.take(),
            self.challenge_reveal_timer.take(),
        ];
        handles.extend(self.breaks.iter_mut().map(|s| s.take_countdown()));
        handles.extend(self.activities.take_timers().into_iter().map(Some));

        let cancelled = handles
            .into_iter()
            .flatten()
            .filter(|&h| self.clock.cancel(h))
            .count();
        self.scroll.discard();
        self.intervention.hide();
        self.shut_down = true;
        info!(cancelled, pending = self.clock.pending(), "notification scheduler shut down");
        cancelled
    }

    // ── Driving time ─────────────────────────────────────────────────

    /// Run every timer due at or before `deadline`, in due-time order, then
    /// move the clock to `deadline`.
    ///
    /// A failing timer is logged and does not stop the others.
    pub fn advance_to(&mut self, deadline: Millis) {
        while let Some(fired) = self.clock.pop_due(deadline) {
            if let Err(err) = self.handle_timer(fired) {
                warn!(timer = ?fired.timer, handle = fired.handle.id(), error = %err, "timer dispatch failed");
            }
        }
        self.clock.advance_to(deadline);
    }

    pub fn advance_by(&mut self, delta: Millis) {
        let deadline = self.clock.now().saturating_add(delta);
        self.advance_to(deadline);
    }

    /// Run timers due by the clock's current time. Wall-clock hosts call
    /// this periodically.
    pub fn run_pending(&mut self) {
        let now = self.clock.now();
        self.advance_to(now);
    }

    /// Dispatch one fired timer.
    ///
    /// Handles the scheduler no longer tracks (cancelled or superseded) are
    /// rejected without side effects.
    pub fn handle_timer(&mut self, fired: Fired) -> Result<(), SchedulerError> {
        self.ensure_running()?;
        let stale = SchedulerError::UnknownNotificationId(fired.handle.id());
        let Fired { handle, timer, .. } = fired;
        match timer {
            Timer::ScrollDebounce => {
                if self.debounce != Some(handle) {
                    return Err(stale);
                }
                self.debounce = None;
                self.close_scroll_span();
                Ok(())
            }
            Timer::AutoDismiss => {
                if self.intervention.auto_dismiss() != Some(handle) {
                    return Err(stale);
                }
                self.hide_intervention(HideReason::TimedOut);
                Ok(())
            }
            Timer::DemoTrigger => {
                if self.demo_timer != Some(handle) {
                    return Err(stale);
                }
                self.demo_timer = None;
                self.trigger_intervention(InterventionSource::Demo)?;
                Ok(())
            }
            Timer::BreakPeriod => {
                if self.break_timer != Some(handle) {
                    return Err(stale);
                }
                self.suggest_break();
                Ok(())
            }
            Timer::BreakRearm => {
                if self.break_timer != Some(handle) {
                    return Err(stale);
                }
                self.break_timer = self
                    .break_interval_ms
                    .map(|interval| self.clock.schedule_repeating(interval, Timer::BreakPeriod));
                self.suggest_break();
                Ok(())
            }
            Timer::BreakCountdown { break_id } => {
                let suggestion = self.breaks.get_mut(break_id)?;
                if suggestion.countdown() != Some(handle) {
                    return Err(stale);
                }
                self.tick_break(break_id)
            }
            Timer::FeedRefresh => {
                if self.feed_timer != Some(handle) {
                    return Err(stale);
                }
                self.refresh_feed();
                Ok(())
            }
            Timer::DashboardReveal => {
                if self.dashboard_timer != Some(handle) {
                    return Err(stale);
                }
                self.dashboard_timer = None;
                let at = self.now();
                self.emit(Event::DashboardRevealed { at });
                Ok(())
            }
            Timer::ChallengeReveal => {
                if self.challenge_reveal_timer != Some(handle) {
                    return Err(stale);
                }
                self.challenge_reveal_timer = None;
                let at = self.now();
                self.emit(Event::ChallengeWidgetRevealed { at });
                Ok(())
            }
            Timer::ChallengeTick => {
                if self.activities.challenge().map(ChallengeRun::countdown) != Some(handle) {
                    return Err(stale);
                }
                self.tick_challenge();
                Ok(())
            }
            Timer::BreathStep => {
                if self.activities.breathing().map(BreathingRun::timer) != Some(handle) {
                    return Err(stale);
                }
                self.advance_breathing();
                Ok(())
            }
        }
    }

    // ── Scroll tracking ──────────────────────────────────────────────

    /// Feed one raw scroll event.
    ///
    /// Timers due before `at` run first, so a quiet period that already
    /// elapsed closes the previous span before this event opens a new one.
    /// Each event restarts the debounce timer.
    pub fn report_scroll_event(&mut self, at: Millis) {
        if self.shut_down {
            trace!(at, "scroll event ignored after shutdown");
            return;
        }
        self.advance_to(at);

        if self.scroll.record(at) {
            debug!(at, "scroll span opened");
        }
        if let Some(previous) = self.debounce.take() {
            self.clock.cancel(previous);
        }
        self.debounce = Some(
            self.clock
                .schedule_once(self.config.debounce_window_ms, Timer::ScrollDebounce),
        );
    }

    fn close_scroll_span(&mut self) {
        let Some(span) = self.scroll.close() else {
            return;
        };
        let exceeded = span.duration_ms() > self.config.intervention_threshold_ms();
        let at = self.now();
        debug!(
            started_at = span.started_at,
            duration_ms = span.duration_ms(),
            exceeded,
            "scroll span closed"
        );
        self.emit(Event::ScrollSpanClosed {
            started_at: span.started_at,
            last_seen_at: span.last_seen_at,
            duration_ms: span.duration_ms(),
            exceeded_threshold: exceeded,
            at,
        });
        if exceeded {
            if let Err(err) = self.trigger_intervention(InterventionSource::Scroll) {
                warn!(error = %err, "scroll intervention failed");
            }
        }
    }

    // ── Interventions ────────────────────────────────────────────────

    /// Show the next rotation message unless an intervention is already
    /// showing, in which case the trigger is dropped.
    ///
    /// Returns whether the intervention was shown.
    pub fn trigger_intervention(
        &mut self,
        source: InterventionSource,
    ) -> Result<bool, SchedulerError> {
        self.ensure_running()?;
        let Some(message) = self.intervention.show() else {
            debug!(?source, "intervention already showing; trigger dropped");
            return Ok(false);
        };

        let handle = self
            .clock
            .schedule_once(self.config.auto_dismiss_ms, Timer::AutoDismiss);
        if let Some(previous) = self.intervention.arm_auto_dismiss(handle) {
            self.clock.cancel(previous);
        }

        let at = self.now();
        debug!(?source, at, "intervention shown");
        self.emit(Event::InterventionShown {
            message,
            source,
            at,
        });
        Ok(true)
    }

    /// Accept the showing intervention.
    ///
    /// Fails with `InvalidStateTransition` when nothing is showing; no state
    /// changes in that case.
    pub fn accept_intervention(&mut self) -> Result<(), SchedulerError> {
        self.ensure_running()?;
        if !self.intervention.is_showing() {
            return Err(SchedulerError::InvalidStateTransition {
                action: "accept intervention",
                state: self.intervention.state().as_str(),
            });
        }
        self.hide_intervention(HideReason::Accepted);
        Ok(())
    }

    /// Dismiss the showing intervention. No-op when idle.
    pub fn dismiss_intervention(&mut self) -> Result<(), SchedulerError> {
        self.ensure_running()?;
        if self.intervention.is_showing() {
            self.hide_intervention(HideReason::Dismissed);
        }
        Ok(())
    }

    /// Arm the startup demo trigger with the configured delay.
    pub fn start_demo_timer(&mut self) -> Result<TimerHandle, SchedulerError> {
        self.start_auto_intervention_after(self.config.demo_trigger_delay_ms)
    }

    /// One-shot intervention after `delay_ms`. Replaces any pending one.
    pub fn start_auto_intervention_after(
        &mut self,
        delay_ms: Millis,
    ) -> Result<TimerHandle, SchedulerError> {
        self.ensure_running()?;
        let handle = self.clock.schedule_once(delay_ms, Timer::DemoTrigger);
        if let Some(previous) = self.demo_timer.replace(handle) {
            self.clock.cancel(previous);
        }
        Ok(handle)
    }

    fn hide_intervention(&mut self, reason: HideReason) {
        if let Some(handle) = self.intervention.hide() {
            self.clock.cancel(handle);
        }
        let at = self.now();
        debug!(?reason, at, "intervention hidden");
        self.emit(Event::InterventionHidden { reason, at });
    }

    // ── Breaks ───────────────────────────────────────────────────────

    /// Suggest a random break every `interval_ms`, replacing any existing
    /// break schedule (including a pending skip re-arm).
    pub fn schedule_breaks(&mut self, interval_ms: Millis) -> Result<TimerHandle, SchedulerError> {
        self.ensure_running()?;
        if interval_ms == 0 {
            return Err(SchedulerError::ZeroInterval("break_interval_ms"));
        }
        let handle = self.clock.schedule_repeating(interval_ms, Timer::BreakPeriod);
        if let Some(previous) = self.break_timer.replace(handle) {
            self.clock.cancel(previous);
        }
        self.break_interval_ms = Some(interval_ms);
        Ok(handle)
    }

    /// Begin the countdown of a suggested break.
    ///
    /// Emits `BreakStarted`, then one `BreakTick` per tick interval, and
    /// `BreakCompleted` once the countdown reaches zero.
    pub fn start_break(&mut self, break_id: BreakId) -> Result<(), SchedulerError> {
        self.ensure_running()?;
        let suggestion = self.breaks.get_mut(break_id)?;
        let duration_secs = suggestion.remaining_secs;

        if duration_secs == 0 {
            suggestion.start(None)?;
            suggestion.complete()?;
            let at = self.now();
            self.emit(Event::BreakStarted {
                break_id,
                duration_secs,
                at,
            });
            self.emit(Event::BreakCompleted { break_id, at });
            return Ok(());
        }

        // Check the transition before arming anything.
        if suggestion.status != BreakStatus::Suggested {
            return suggestion.start(None);
        }
        let handle = self.clock.schedule_repeating(
            self.config.break_tick_ms,
            Timer::BreakCountdown { break_id },
        );
        if let Err(err) = self.breaks.get_mut(break_id)?.start(Some(handle)) {
            self.clock.cancel(handle);
            return Err(err);
        }

        let at = self.now();
        debug!(%break_id, duration_secs, "break started");
        self.emit(Event::BreakStarted {
            break_id,
            duration_secs,
            at,
        });
        Ok(())
    }

    /// Skip a suggested or running break.
    ///
    /// The skip resets the break period: the regular schedule is cancelled
    /// and the next suggestion comes `break_skip_rearm_ms` from now, after
    /// which the regular interval resumes.
    pub fn skip_break(&mut self, break_id: BreakId) -> Result<(), SchedulerError> {
        self.ensure_running()?;
        if let Some(countdown) = self.breaks.get_mut(break_id)?.skip()? {
            self.clock.cancel(countdown);
        }

        let rearm_ms = self.config.break_skip_rearm_ms;
        let handle = self.clock.schedule_once(rearm_ms, Timer::BreakRearm);
        if let Some(previous) = self.break_timer.replace(handle) {
            self.clock.cancel(previous);
        }

        let at = self.now();
        debug!(%break_id, rearm_ms, "break skipped");
        self.emit(Event::BreakSkipped {
            break_id,
            next_suggestion_in_ms: rearm_ms,
            at,
        });
        Ok(())
    }

    fn suggest_break(&mut self) {
        let index = self.rng.next_index(self.catalog.breaks.len());
        let break_type = self.catalog.breaks[index].clone();
        let at = self.now();
        let break_id = self.breaks.suggest(break_type.clone(), at).id;
        debug!(%break_id, name = %break_type.name, "break suggested");
        self.emit(Event::BreakSuggested {
            break_id,
            break_type,
            at,
        });
    }

    fn tick_break(&mut self, break_id: BreakId) -> Result<(), SchedulerError> {
        let at = self.now();
        let suggestion = self.breaks.get_mut(break_id)?;
        let remaining_secs = suggestion.tick()?;
        let finished = if remaining_secs == 0 {
            suggestion.complete()?
        } else {
            None
        };

        self.emit(Event::BreakTick {
            break_id,
            remaining_secs,
            at,
        });
        if remaining_secs == 0 {
            if let Some(countdown) = finished {
                self.clock.cancel(countdown);
            }
            debug!(%break_id, "break completed");
            self.emit(Event::BreakCompleted { break_id, at });
        }
        Ok(())
    }

    // ── Reward activities ────────────────────────────────────────────

    /// Start the focus challenge countdown.
    ///
    /// Emits `ActivityStarted`, one `ChallengeTick` per tick interval, and
    /// `ActivityCompleted` when it reaches zero.
    pub fn start_challenge(&mut self) -> Result<(), SchedulerError> {
        self.ensure_running()?;
        self.activities.ensure_idle(ActivityKind::Challenge)?;
        let duration_secs = self.config.challenge_duration_secs;
        let handle = self
            .clock
            .schedule_repeating(self.config.break_tick_ms, Timer::ChallengeTick);
        self.activities.challenge = Some(ChallengeRun::new(duration_secs, handle));

        let at = self.now();
        debug!(duration_secs, "challenge started");
        self.emit(Event::ActivityStarted {
            kind: ActivityKind::Challenge,
            at,
        });
        Ok(())
    }

    /// Start the mindful breathing exercise.
    ///
    /// Each breath is an inhale of `inhale_ms` then an exhale of
    /// `exhale_ms`; every phase emits `BreathPhase`. `ActivityCompleted`
    /// follows the last exhale.
    pub fn start_mindful_breathing(&mut self) -> Result<(), SchedulerError> {
        self.ensure_running()?;
        self.activities.ensure_idle(ActivityKind::Mindful)?;
        let handle = self
            .clock
            .schedule_once(self.config.inhale_ms, Timer::BreathStep);
        let run = BreathingRun::new(self.config.breath_count, handle);
        let (breath, step) = (run.breath(), run.step());
        self.activities.breathing = Some(run);

        let at = self.now();
        debug!(breaths = self.config.breath_count, "breathing started");
        self.emit(Event::ActivityStarted {
            kind: ActivityKind::Mindful,
            at,
        });
        self.emit(Event::BreathPhase { breath, step, at });
        Ok(())
    }

    /// Reveal the community challenge widget once, `delay_ms` from now.
    pub fn schedule_challenge_reveal(
        &mut self,
        delay_ms: Millis,
    ) -> Result<TimerHandle, SchedulerError> {
        self.ensure_running()?;
        let handle = self.clock.schedule_once(delay_ms, Timer::ChallengeReveal);
        if let Some(previous) = self.challenge_reveal_timer.replace(handle) {
            self.clock.cancel(previous);
        }
        Ok(handle)
    }

    fn tick_challenge(&mut self) {
        let at = self.now();
        let Some(run) = self.activities.challenge.as_mut() else {
            return;
        };
        let remaining_secs = run.tick();
        self.emit(Event::ChallengeTick { remaining_secs, at });
        if remaining_secs > 0 {
            return;
        }
        if let Some(run) = self.activities.challenge.take() {
            self.clock.cancel(run.countdown());
        }
        debug!("challenge completed");
        self.emit(Event::ActivityCompleted {
            kind: ActivityKind::Challenge,
            at,
        });
    }

    fn advance_breathing(&mut self) {
        let at = self.now();
        let Some(run) = self.activities.breathing.as_mut() else {
            return;
        };
        match run.advance() {
            Some(step) => {
                let delay = match step {
                    BreathStep::Inhale => self.config.inhale_ms,
                    BreathStep::Exhale => self.config.exhale_ms,
                };
                let breath = run.breath();
                run.set_timer(self.clock.schedule_once(delay, Timer::BreathStep));
                self.emit(Event::BreathPhase { breath, step, at });
            }
            None => {
                self.activities.breathing = None;
                debug!("breathing completed");
                self.emit(Event::ActivityCompleted {
                    kind: ActivityKind::Mindful,
                    at,
                });
            }
        }
    }

    // ── Feed & dashboard ─────────────────────────────────────────────

    /// Redraw the feed every `interval_ms`, replacing any existing schedule.
    pub fn schedule_feed_refresh(
        &mut self,
        interval_ms: Millis,
    ) -> Result<TimerHandle, SchedulerError> {
        self.ensure_running()?;
        if interval_ms == 0 {
            return Err(SchedulerError::ZeroInterval("feed_refresh_interval_ms"));
        }
        let handle = self.clock.schedule_repeating(interval_ms, Timer::FeedRefresh);
        if let Some(previous) = self.feed_timer.replace(handle) {
            self.clock.cancel(previous);
        }
        Ok(handle)
    }

    /// Redraw the feed immediately. The periodic schedule is unaffected.
    pub fn refresh_feed_now(&mut self) -> Result<(), SchedulerError> {
        self.ensure_running()?;
        self.refresh_feed();
        Ok(())
    }

    /// Reveal the progress dashboard once, `delay_ms` from now.
    pub fn schedule_dashboard_reveal(
        &mut self,
        delay_ms: Millis,
    ) -> Result<TimerHandle, SchedulerError> {
        self.ensure_running()?;
        let handle = self.clock.schedule_once(delay_ms, Timer::DashboardReveal);
        if let Some(previous) = self.dashboard_timer.replace(handle) {
            self.clock.cancel(previous);
        }
        Ok(handle)
    }

    fn refresh_feed(&mut self) {
        let items = self.draw_feed();
        let at = self.now();
        debug!(count = items.len(), at, "feed refreshed");
        self.emit(Event::FeedRefreshed { items, at });
    }

    fn draw_feed(&mut self) -> Vec<ContentItem> {
        self.rng
            .sample_distinct(self.catalog.content.len(), self.config.feed_size)
            .into_iter()
            .map(|i| self.catalog.content[i].clone())
            .collect()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn ensure_running(&self) -> Result<(), SchedulerError> {
        if self.shut_down {
            Err(SchedulerError::ShutDown)
        } else {
            Ok(())
        }
    }

    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}
