//! AI-buddy intervention state and message rotation.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Showing -> Idle   (accepted | dismissed | timed out)
//! ```
//!
//! A trigger while `Showing` is dropped, never queued.

use serde::{Deserialize, Serialize};

use crate::clock::TimerHandle;
use crate::error::SchedulerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterventionState {
    Idle,
    Showing,
}

impl InterventionState {
    pub fn as_str(self) -> &'static str {
        match self {
            InterventionState::Idle => "idle",
            InterventionState::Showing => "showing",
        }
    }
}

/// What asked for the intervention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterventionSource {
    /// A scroll span exceeded the threshold.
    Scroll,
    /// The one-shot startup timer.
    Demo,
    /// Explicit request from the host.
    Manual,
}

impl InterventionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            InterventionSource::Scroll => "scroll",
            InterventionSource::Demo => "demo",
            InterventionSource::Manual => "manual",
        }
    }
}

/// Why an intervention left the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HideReason {
    Accepted,
    Dismissed,
    TimedOut,
}

impl HideReason {
    pub fn as_str(self) -> &'static str {
        match self {
            HideReason::Accepted => "accepted",
            HideReason::Dismissed => "dismissed",
            HideReason::TimedOut => "timed out",
        }
    }
}

/// Round-robin over a fixed, non-empty message list.
#[derive(Debug, Clone)]
pub struct MessageRotation {
    messages: Vec<String>,
    index: usize,
}

impl MessageRotation {
    pub fn new(messages: Vec<String>) -> Result<Self, SchedulerError> {
        if messages.is_empty() {
            return Err(SchedulerError::EmptyCatalog("messages"));
        }
        Ok(Self { messages, index: 0 })
    }

    /// Message that the next successful trigger will show.
    pub fn peek(&self) -> &str {
        &self.messages[self.index]
    }

    /// Take the current message and advance.
    pub fn advance(&mut self) -> String {
        let message = self.messages[self.index].clone();
        self.index = (self.index + 1) % self.messages.len();
        message
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// The single intervention slot.
#[derive(Debug, Clone)]
pub struct Intervention {
    state: InterventionState,
    rotation: MessageRotation,
    message: Option<String>,
    auto_dismiss: Option<TimerHandle>,
}

impl Intervention {
    pub fn new(rotation: MessageRotation) -> Self {
        Self {
            state: InterventionState::Idle,
            rotation,
            message: None,
            auto_dismiss: None,
        }
    }

    pub fn state(&self) -> InterventionState {
        self.state
    }

    pub fn is_showing(&self) -> bool {
        self.state == InterventionState::Showing
    }

    /// Message currently on screen.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn rotation(&self) -> &MessageRotation {
        &self.rotation
    }

    pub fn auto_dismiss(&self) -> Option<TimerHandle> {
        self.auto_dismiss
    }

    /// Idle -> Showing. Returns the chosen message, or `None` if already showing.
    pub fn show(&mut self) -> Option<String> {
        if self.is_showing() {
            return None;
        }
        let message = self.rotation.advance();
        self.state = InterventionState::Showing;
        self.message = Some(message.clone());
        Some(message)
    }

    /// Replace the auto-dismiss handle, returning the one it supersedes.
    pub fn arm_auto_dismiss(&mut self, handle: TimerHandle) -> Option<TimerHandle> {
        self.auto_dismiss.replace(handle)
    }

    /// Release the auto-dismiss handle without changing state.
    pub fn take_auto_dismiss(&mut self) -> Option<TimerHandle> {
        self.auto_dismiss.take()
    }

    /// Showing -> Idle. Returns the pending auto-dismiss handle to cancel.
    pub fn hide(&mut self) -> Option<TimerHandle> {
        self.state = InterventionState::Idle;
        self.message = None;
        self.auto_dismiss.take()
    }
}
