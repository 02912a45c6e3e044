//! # MindGuard Core Library
//!
//! This library provides the scheduling core of MindGuard, a digital
//! wellbeing companion. It decides when an intervention, a break suggestion,
//! a feed refresh or the progress dashboard appears, and reports each change
//! as an [`Event`] for a rendering layer to draw.
//!
//! ## Architecture
//!
//! - **Notification Scheduler**: a state machine over an injected clock. It
//!   has no internal threads; the caller advances a virtual clock or polls a
//!   wall clock with `run_pending()`
//! - **Clock**: timer queue with cancellable handles and FIFO ordering for
//!   equal due times
//! - **Random source**: injectable, seeded for reproducible runs
//! - **Activities**: the challenge countdown and mindful breathing offered
//!   after an accepted intervention
//! - **Progress**: folds events into XP, streak and daily counters
//!
//! ## Key Components
//!
//! - [`NotificationScheduler`]: interventions, breaks, feed and dashboard
//! - [`ManualClock`] / [`SystemClock`]: virtual and wall-clock time
//! - [`ProgressTracker`]: XP, level and counters
//! - [`Config`]: TOML configuration

pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod progress;
pub mod random;
pub mod scheduler;

pub use catalog::{BreakType, Catalog, ContentItem, ContentKind};
pub use clock::{Clock, Fired, ManualClock, Millis, SystemClock, Timer, TimerHandle};
pub use config::{Config, SchedulerConfig, SimulationConfig};
pub use error::{ConfigError, CoreError, SchedulerError};
pub use events::Event;
pub use progress::{ProgressStats, ProgressTracker};
pub use random::{RandomSource, SeededRandom, SequenceRandom};
pub use scheduler::{
    ActivityKind, BreakId, BreakStatus, BreakSuggestion, BreathStep, HideReason,
    InterventionSource, InterventionState, NotificationScheduler, ScrollActivitySpan,
};
