mod activity;
mod breaks;
mod engine;
mod intervention;
mod scroll;

pub use activity::{Activities, ActivityKind, BreathStep, BreathingRun, ChallengeRun};
pub use breaks::{BreakBoard, BreakId, BreakStatus, BreakSuggestion};
pub use engine::NotificationScheduler;
pub use intervention::{
    HideReason, Intervention, InterventionSource, InterventionState, MessageRotation,
};
pub use scroll::{ScrollActivitySpan, ScrollTracker};
