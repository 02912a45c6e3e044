//! Smart-break suggestions and their lifecycle.
//!
//! ```text
//! Suggested -> InProgress -> Completed
//!     |            |
//!     +------------+-> Skipped
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::BreakType;
use crate::clock::{Millis, TimerHandle};
use crate::error::SchedulerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BreakId(pub u64);

impl fmt::Display for BreakId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BreakId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(BreakId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakStatus {
    Suggested,
    InProgress,
    Completed,
    Skipped,
}

impl BreakStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BreakStatus::Suggested => "suggested",
            BreakStatus::InProgress => "in progress",
            BreakStatus::Completed => "completed",
            BreakStatus::Skipped => "skipped",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BreakStatus::Completed | BreakStatus::Skipped)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakSuggestion {
    pub id: BreakId,
    pub break_type: BreakType,
    pub status: BreakStatus,
    /// Seconds left on the countdown; the full duration until started.
    pub remaining_secs: u32,
    pub suggested_at: Millis,
    #[serde(skip)]
    countdown: Option<TimerHandle>,
}

impl BreakSuggestion {
    pub fn countdown(&self) -> Option<TimerHandle> {
        self.countdown
    }

    /// Suggested -> InProgress.
    pub fn start(&mut self, countdown: Option<TimerHandle>) -> Result<(), SchedulerError> {
        if self.status != BreakStatus::Suggested {
            return Err(self.invalid("start break"));
        }
        self.status = BreakStatus::InProgress;
        self.countdown = countdown;
        Ok(())
    }

    /// One second elapsed. Returns the remaining seconds.
    pub fn tick(&mut self) -> Result<u32, SchedulerError> {
        if self.status != BreakStatus::InProgress {
            return Err(self.invalid("tick break"));
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        Ok(self.remaining_secs)
    }

    /// InProgress -> Completed. Returns the countdown handle to cancel.
    pub fn complete(&mut self) -> Result<Option<TimerHandle>, SchedulerError> {
        if self.status != BreakStatus::InProgress {
            return Err(self.invalid("complete break"));
        }
        self.status = BreakStatus::Completed;
        self.remaining_secs = 0;
        Ok(self.countdown.take())
    }

    /// Suggested | InProgress -> Skipped. Returns the countdown handle to cancel.
    pub fn skip(&mut self) -> Result<Option<TimerHandle>, SchedulerError> {
        if self.status.is_terminal() {
            return Err(self.invalid("skip break"));
        }
        self.status = BreakStatus::Skipped;
        Ok(self.countdown.take())
    }

    /// Release the countdown handle on shutdown.
    pub(crate) fn take_countdown(&mut self) -> Option<TimerHandle> {
        self.countdown.take()
    }

    fn invalid(&self, action: &'static str) -> SchedulerError {
        SchedulerError::InvalidStateTransition {
            action,
            state: self.status.as_str(),
        }
    }
}

/// All suggestions created during the process lifetime.
///
/// Breaks are not bound by the single-notification rule; any number may be
/// pending at once.
#[derive(Debug, Clone, Default)]
pub struct BreakBoard {
    next_id: u64,
    suggestions: BTreeMap<BreakId, BreakSuggestion>,
}

impl BreakBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suggest(&mut self, break_type: BreakType, at: Millis) -> &BreakSuggestion {
        self.next_id += 1;
        let id = BreakId(self.next_id);
        let remaining_secs = break_type.duration_secs;
        self.suggestions.entry(id).or_insert(BreakSuggestion {
            id,
            break_type,
            status: BreakStatus::Suggested,
            remaining_secs,
            suggested_at: at,
            countdown: None,
        })
    }

    pub fn get(&self, id: BreakId) -> Option<&BreakSuggestion> {
        self.suggestions.get(&id)
    }

    pub fn get_mut(&mut self, id: BreakId) -> Result<&mut BreakSuggestion, SchedulerError> {
        self.suggestions
            .get_mut(&id)
            .ok_or(SchedulerError::UnknownBreakId(id))
    }

    /// Suggestions that are still waiting or running.
    pub fn active(&self) -> impl Iterator<Item = &BreakSuggestion> {
        self.suggestions.values().filter(|s| !s.status.is_terminal())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut BreakSuggestion> {
        self.suggestions.values_mut()
    }

    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}
