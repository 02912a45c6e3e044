use serde::{Deserialize, Serialize};

use crate::catalog::{BreakType, ContentItem};
use crate::clock::Millis;
use crate::scheduler::{ActivityKind, BreakId, BreathStep, HideReason, InterventionSource};

/// Every visible change the scheduler makes produces an Event.
/// The rendering layer drains them; the progress tracker folds them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A continuous scroll span ended after the debounce window.
    ScrollSpanClosed {
        started_at: Millis,
        last_seen_at: Millis,
        duration_ms: Millis,
        /// Whether the span was long enough to ask for an intervention.
        exceeded_threshold: bool,
        at: Millis,
    },
    InterventionShown {
        message: String,
        source: InterventionSource,
        at: Millis,
    },
    InterventionHidden {
        reason: HideReason,
        at: Millis,
    },
    BreakSuggested {
        break_id: BreakId,
        break_type: BreakType,
        at: Millis,
    },
    BreakStarted {
        break_id: BreakId,
        duration_secs: u32,
        at: Millis,
    },
    BreakTick {
        break_id: BreakId,
        remaining_secs: u32,
        at: Millis,
    },
    BreakCompleted {
        break_id: BreakId,
        at: Millis,
    },
    /// A break was skipped; the next suggestion comes sooner than usual.
    BreakSkipped {
        break_id: BreakId,
        next_suggestion_in_ms: Millis,
        at: Millis,
    },
    FeedRefreshed {
        items: Vec<ContentItem>,
        at: Millis,
    },
    DashboardRevealed {
        at: Millis,
    },
    ChallengeWidgetRevealed {
        at: Millis,
    },
    ActivityStarted {
        kind: ActivityKind,
        at: Millis,
    },
    ChallengeTick {
        remaining_secs: u32,
        at: Millis,
    },
    /// A breathing phase began. `breath` is 1-based.
    BreathPhase {
        breath: u32,
        step: BreathStep,
        at: Millis,
    },
    ActivityCompleted {
        kind: ActivityKind,
        at: Millis,
    },
}

impl Event {
    /// When the event was emitted.
    pub fn at(&self) -> Millis {
        match self {
            Event::ScrollSpanClosed { at, .. }
            | Event::InterventionShown { at, .. }
            | Event::InterventionHidden { at, .. }
            | Event::BreakSuggested { at, .. }
            | Event::BreakStarted { at, .. }
            | Event::BreakTick { at, .. }
            | Event::BreakCompleted { at, .. }
            | Event::BreakSkipped { at, .. }
            | Event::FeedRefreshed { at, .. }
            | Event::DashboardRevealed { at }
            | Event::ChallengeWidgetRevealed { at }
            | Event::ActivityStarted { at, .. }
            | Event::ChallengeTick { at, .. }
            | Event::BreathPhase { at, .. }
            | Event::ActivityCompleted { at, .. } => *at,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::ScrollSpanClosed { .. } => "scroll_span_closed",
            Event::InterventionShown { .. } => "intervention_shown",
            Event::InterventionHidden { .. } => "intervention_hidden",
            Event::BreakSuggested { .. } => "break_suggested",
            Event::BreakStarted { .. } => "break_started",
            Event::BreakTick { .. } => "break_tick",
            Event::BreakCompleted { .. } => "break_completed",
            Event::BreakSkipped { .. } => "break_skipped",
            Event::FeedRefreshed { .. } => "feed_refreshed",
            Event::DashboardRevealed { .. } => "dashboard_revealed",
            Event::ChallengeWidgetRevealed { .. } => "challenge_widget_revealed",
            Event::ActivityStarted { .. } => "activity_started",
            Event::ChallengeTick { .. } => "challenge_tick",
            Event::BreathPhase { .. } => "breath_phase",
            Event::ActivityCompleted { .. } => "activity_completed",
        }
    }
}
