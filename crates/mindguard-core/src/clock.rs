//! Clock collaborators for the notification scheduler.
//!
//! Timers are data rather than closures: each entry carries a [`Timer`]
//! naming the work to do when it fires, and the scheduler pulls due entries
//! out of the clock and dispatches them itself. There are no internal
//! threads. The caller drives time forward, either by jumping a
//! [`ManualClock`] or by periodically polling a [`SystemClock`].
//!
//! Entries due at the same instant fire in the order they were scheduled.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduler::BreakId;

/// Milliseconds since the clock's origin.
pub type Millis = u64;

/// Cancellable reference to a scheduled timer.
///
/// Repeating timers keep the same handle across firings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Timer {
    /// Quiet period after the last scroll event elapsed.
    ScrollDebounce,
    /// Intervention went unanswered.
    AutoDismiss,
    /// One-shot intervention shortly after startup.
    DemoTrigger,
    /// Regular break suggestion.
    BreakPeriod,
    /// Short re-suggestion after a skipped break.
    BreakRearm,
    /// One second of a running break.
    BreakCountdown { break_id: BreakId },
    /// Periodic healthy-feed redraw.
    FeedRefresh,
    /// Progress dashboard becomes visible.
    DashboardReveal,
    /// Community challenge widget becomes visible.
    ChallengeReveal,
    /// One second of the focus challenge.
    ChallengeTick,
    /// End of the current inhale or exhale phase.
    BreathStep,
}

/// A timer popped from the clock because it came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub handle: TimerHandle,
    pub timer: Timer,
    pub due: Millis,
}

/// Deferred-callback source used by the scheduler.
pub trait Clock {
    /// Current time.
    fn now(&self) -> Millis;

    /// Schedule `timer` to fire once, `delay` from now.
    fn schedule_once(&mut self, delay: Millis, timer: Timer) -> TimerHandle;

    /// Schedule `timer` to fire every `interval`, first one `interval` from now.
    fn schedule_repeating(&mut self, interval: Millis, timer: Timer) -> TimerHandle;

    /// Cancel a pending timer. Returns `false` if it already fired or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    /// Remove and return the earliest timer due at or before `deadline`.
    ///
    /// Virtual clocks move `now` to the popped timer's due time, so work done
    /// while dispatching it observes the correct instant.
    fn pop_due(&mut self, deadline: Millis) -> Option<Fired>;

    /// Move a virtual clock forward to `t`. Wall clocks ignore this.
    fn advance_to(&mut self, t: Millis);

    /// Number of timers still waiting to fire.
    fn pending(&self) -> usize;
}

#[derive(Debug, Clone)]
struct Entry {
    handle: TimerHandle,
    timer: Timer,
    interval: Option<Millis>,
}

/// Ordered timer storage shared by the clock implementations.
///
/// Keyed by `(due, sequence)` so equal due times keep FIFO order.
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    next_seq: u64,
    next_handle: u64,
    entries: BTreeMap<(Millis, u64), Entry>,
    index: HashMap<TimerHandle, (Millis, u64)>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, due: Millis, timer: Timer, interval: Option<Millis>) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.push(
            due,
            Entry {
                handle,
                timer,
                // A zero interval would re-fire at the same instant forever.
                interval: interval.map(|i| i.max(1)),
            },
        );
        handle
    }

    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.index.remove(&handle) {
            Some(key) => self.entries.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn pop_due(&mut self, deadline: Millis) -> Option<Fired> {
        let (&key, _) = self.entries.first_key_value()?;
        if key.0 > deadline {
            return None;
        }
        let entry = self.entries.remove(&key)?;
        self.index.remove(&entry.handle);

        let fired = Fired {
            handle: entry.handle,
            timer: entry.timer,
            due: key.0,
        };
        // A repeat that would land past the end of time is dropped.
        if let Some(next) = entry.interval.and_then(|i| key.0.checked_add(i)) {
            self.push(next, entry);
        }
        Some(fired)
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.entries.keys().next().map(|(due, _)| *due)
    }

    pub fn contains(&self, handle: TimerHandle) -> bool {
        self.index.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, due: Millis, entry: Entry) {
        self.next_seq += 1;
        let key = (due, self.next_seq);
        self.index.insert(entry.handle, key);
        self.entries.insert(key, entry);
    }
}

/// Virtual clock. Time only moves when the caller advances it.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Millis,
    queue: TimerQueue,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the clock at `now` instead of zero.
    pub fn starting_at(now: Millis) -> Self {
        Self {
            now,
            queue: TimerQueue::new(),
        }
    }

    /// Whether `handle` is still waiting to fire.
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.queue.contains(handle)
    }

    /// Due time of the earliest pending timer.
    pub fn next_due(&self) -> Option<Millis> {
        self.queue.next_due()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        self.now
    }

    fn schedule_once(&mut self, delay: Millis, timer: Timer) -> TimerHandle {
        self.queue.insert(self.now.saturating_add(delay), timer, None)
    }

    fn schedule_repeating(&mut self, interval: Millis, timer: Timer) -> TimerHandle {
        self.queue
            .insert(self.now.saturating_add(interval), timer, Some(interval))
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.queue.cancel(handle)
    }

    fn pop_due(&mut self, deadline: Millis) -> Option<Fired> {
        let fired = self.queue.pop_due(deadline)?;
        self.now = self.now.max(fired.due);
        Some(fired)
    }

    fn advance_to(&mut self, t: Millis) {
        self.now = self.now.max(t);
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}

/// Wall clock measured from the moment it was created.
#[derive(Debug, Clone)]
pub struct SystemClock {
    started_at: DateTime<Utc>,
    queue: TimerQueue,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            queue: TimerQueue::new(),
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Millis {
        (Utc::now() - self.started_at).num_milliseconds().max(0) as u64
    }

    fn schedule_once(&mut self, delay: Millis, timer: Timer) -> TimerHandle {
        let due = self.now().saturating_add(delay);
        self.queue.insert(due, timer, None)
    }

    fn schedule_repeating(&mut self, interval: Millis, timer: Timer) -> TimerHandle {
        let due = self.now().saturating_add(interval);
        self.queue.insert(due, timer, Some(interval))
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.queue.cancel(handle)
    }

    fn pop_due(&mut self, deadline: Millis) -> Option<Fired> {
        // Never run ahead of real time.
        self.queue.pop_due(deadline.min(self.now()))
    }

    fn advance_to(&mut self, _t: Millis) {}

    fn pending(&self) -> usize {
        self.queue.len()
    }
}
