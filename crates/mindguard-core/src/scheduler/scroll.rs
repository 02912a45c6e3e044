//! Scroll activity accumulation.
//!
//! The tracker only holds the open span; the debounce timer that closes it
//! lives in the scheduler, which owns the clock.

use serde::{Deserialize, Serialize};

use crate::clock::Millis;

/// One run of continuous scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollActivitySpan {
    pub started_at: Millis,
    pub last_seen_at: Millis,
}

impl ScrollActivitySpan {
    pub fn duration_ms(&self) -> Millis {
        self.last_seen_at - self.started_at
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScrollTracker {
    open: Option<ScrollActivitySpan>,
    last_closed: Option<ScrollActivitySpan>,
    closed_count: u64,
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a scroll event. Returns `true` if it opened a new span.
    ///
    /// Out-of-order timestamps never shrink a span.
    pub fn record(&mut self, at: Millis) -> bool {
        match self.open.as_mut() {
            Some(span) => {
                span.last_seen_at = span.last_seen_at.max(at);
                false
            }
            None => {
                self.open = Some(ScrollActivitySpan {
                    started_at: at,
                    last_seen_at: at,
                });
                true
            }
        }
    }

    /// Close the open span, if any.
    pub fn close(&mut self) -> Option<ScrollActivitySpan> {
        let span = self.open.take()?;
        self.last_closed = Some(span);
        self.closed_count += 1;
        Some(span)
    }

    /// Drop the open span without counting it.
    pub fn discard(&mut self) -> Option<ScrollActivitySpan> {
        self.open.take()
    }

    pub fn open_span(&self) -> Option<&ScrollActivitySpan> {
        self.open.as_ref()
    }

    pub fn last_closed(&self) -> Option<&ScrollActivitySpan> {
        self.last_closed.as_ref()
    }

    pub fn closed_count(&self) -> u64 {
        self.closed_count
    }
}
