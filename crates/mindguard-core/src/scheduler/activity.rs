//! Timed reward activities offered after an accepted intervention.
//!
//! - **Challenge**: a fixed countdown, one tick per second.
//! - **Mindful breathing**: a number of breaths, each an inhale then an
//!   exhale phase.
//!
//! Each kind runs at most once at a time. Starting a running kind is an
//! invalid transition.

use serde::{Deserialize, Serialize};

use crate::clock::TimerHandle;
use crate::error::SchedulerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Challenge,
    Mindful,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::Challenge => "challenge",
            ActivityKind::Mindful => "mindful",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathStep {
    Inhale,
    Exhale,
}

impl BreathStep {
    pub fn as_str(self) -> &'static str {
        match self {
            BreathStep::Inhale => "inhale",
            BreathStep::Exhale => "exhale",
        }
    }
}

/// A running challenge countdown.
#[derive(Debug, Clone)]
pub struct ChallengeRun {
    remaining_secs: u32,
    countdown: TimerHandle,
}

impl ChallengeRun {
    pub fn new(duration_secs: u32, countdown: TimerHandle) -> Self {
        Self {
            remaining_secs: duration_secs,
            countdown,
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn countdown(&self) -> TimerHandle {
        self.countdown
    }

    /// One second elapsed. Returns the remaining seconds.
    pub fn tick(&mut self) -> u32 {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        self.remaining_secs
    }
}

/// A running breathing exercise.
#[derive(Debug, Clone)]
pub struct BreathingRun {
    /// 1-based breath currently in progress.
    breath: u32,
    total: u32,
    step: BreathStep,
    timer: TimerHandle,
}

impl BreathingRun {
    /// Starts on the first inhale.
    pub fn new(total: u32, timer: TimerHandle) -> Self {
        Self {
            breath: 1,
            total,
            step: BreathStep::Inhale,
            timer,
        }
    }

    pub fn breath(&self) -> u32 {
        self.breath
    }

    pub fn step(&self) -> BreathStep {
        self.step
    }

    pub fn timer(&self) -> TimerHandle {
        self.timer
    }

    pub fn set_timer(&mut self, timer: TimerHandle) {
        self.timer = timer;
    }

    /// The current phase ended. Moves to the next phase and returns it, or
    /// `None` once the last exhale is done.
    pub fn advance(&mut self) -> Option<BreathStep> {
        match self.step {
            BreathStep::Inhale => self.step = BreathStep::Exhale,
            BreathStep::Exhale => {
                if self.breath >= self.total {
                    return None;
                }
                self.breath += 1;
                self.step = BreathStep::Inhale;
            }
        }
        Some(self.step)
    }
}

/// The activity slots. One of each kind at most.
#[derive(Debug, Clone, Default)]
pub struct Activities {
    pub(crate) challenge: Option<ChallengeRun>,
    pub(crate) breathing: Option<BreathingRun>,
}

impl Activities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self, kind: ActivityKind) -> bool {
        match kind {
            ActivityKind::Challenge => self.challenge.is_some(),
            ActivityKind::Mindful => self.breathing.is_some(),
        }
    }

    pub fn challenge(&self) -> Option<&ChallengeRun> {
        self.challenge.as_ref()
    }

    pub fn breathing(&self) -> Option<&BreathingRun> {
        self.breathing.as_ref()
    }

    /// Fails if `kind` is already running.
    pub fn ensure_idle(&self, kind: ActivityKind) -> Result<(), SchedulerError> {
        if self.is_running(kind) {
            return Err(SchedulerError::InvalidStateTransition {
                action: match kind {
                    ActivityKind::Challenge => "start challenge",
                    ActivityKind::Mindful => "start breathing",
                },
                state: "in progress",
            });
        }
        Ok(())
    }

    /// Clear both slots, returning their pending timers.
    pub(crate) fn take_timers(&mut self) -> Vec<TimerHandle> {
        let challenge = self.challenge.take().map(|c| c.countdown);
        let breathing = self.breathing.take().map(|b| b.timer);
        challenge.into_iter().chain(breathing).collect()
    }
}
