//! Cooperative timer primitives shared by the world and every system.
//!
//! Every periodic routine in the director is an explicit "due at" record
//! polled against the simulated session clock. Nothing here sleeps or owns a
//! thread; callers poll whenever a tick arrives.

use std::time::Duration;

/// Converts designer-facing seconds into a [`Duration`].
///
/// Negative and NaN inputs clamp to zero; values too large for a duration
/// saturate at [`Duration::MAX`].
#[must_use]
pub fn seconds(value: f32) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f32(value).unwrap_or(Duration::MAX)
}

/// Periodic timer that fires at most once per poll and skips missed periods.
///
/// When ticks arrive late the timer fires once and realigns to the next
/// boundary of its original schedule, so consecutive firings are never closer
/// than one period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interval {
    period: Duration,
    next_due: Duration,
}

impl Interval {
    /// Creates a timer that first fires at `now` and then once per `period`.
    #[must_use]
    pub const fn immediate(period: Duration, now: Duration) -> Self {
        Self {
            period,
            next_due: now,
        }
    }

    /// Creates a timer whose first firing lies one full period after `now`.
    #[must_use]
    pub fn delayed(period: Duration, now: Duration) -> Self {
        Self {
            period,
            next_due: now.saturating_add(period),
        }
    }

    /// Period between consecutive firings.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Session time at which the timer fires next.
    #[must_use]
    pub const fn next_due(&self) -> Duration {
        self.next_due
    }

    /// Replaces the period. The already scheduled firing is kept; the new
    /// period applies to every wait after it.
    pub fn set_period(&mut self, period: Duration) {
        self.period = period;
    }

    /// Reports whether the timer fired at `now`, advancing it when it did.
    ///
    /// Once due, a zero period fires on every poll.
    pub fn poll(&mut self, now: Duration) -> bool {
        if now < self.next_due {
            return false;
        }
        if self.period.is_zero() {
            self.next_due = now;
            return true;
        }

        let overdue = now - self.next_due;
        let skipped = overdue.as_nanos() / self.period.as_nanos();
        let steps = u32::try_from(skipped.saturating_add(1)).unwrap_or(u32::MAX);
        self.next_due = self
            .next_due
            .saturating_add(self.period.saturating_mul(steps));
        true
    }
}

/// Single-shot cooldown measured from the last time it was triggered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cooldown {
    period: Duration,
    last: Option<Duration>,
}

impl Cooldown {
    /// Creates a cooldown that is ready immediately.
    #[must_use]
    pub const fn ready(period: Duration) -> Self {
        Self { period, last: None }
    }

    /// Creates a cooldown that behaves as if it was triggered at `now`.
    #[must_use]
    pub const fn started_at(period: Duration, now: Duration) -> Self {
        Self {
            period,
            last: Some(now),
        }
    }

    /// Length of the cooldown window.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Time of the last trigger, if any.
    #[must_use]
    pub const fn last(&self) -> Option<Duration> {
        self.last
    }

    /// Replaces the cooldown window without forgetting the last trigger.
    pub fn set_period(&mut self, period: Duration) {
        self.period = period;
    }

    /// Reports whether the cooldown window has elapsed at `now`.
    #[must_use]
    pub fn is_ready(&self, now: Duration) -> bool {
        self.last
            .map_or(true, |last| now.saturating_sub(last) >= self.period)
    }

    /// Time left until the cooldown becomes ready.
    #[must_use]
    pub fn remaining(&self, now: Duration) -> Duration {
        match self.last {
            Some(last) => self.period.saturating_sub(now.saturating_sub(last)),
            None => Duration::ZERO,
        }
    }

    /// Restarts the window at `now`.
    pub fn trigger(&mut self, now: Duration) {
        self.last = Some(now);
    }
}

/// Queue of deferred effects released once their due time passes.
#[derive(Clone, Debug)]
pub struct Schedule<T> {
    entries: Vec<Scheduled<T>>,
    sequence: u64,
}

#[derive(Clone, Debug)]
struct Scheduled<T> {
    due: Duration,
    sequence: u64,
    item: T,
}

impl<T> Default for Schedule<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            sequence: 0,
        }
    }
}

impl<T> Schedule<T> {
    /// Creates an empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `item` for release at `due`.
    pub fn push(&mut self, due: Duration, item: T) {
        let sequence = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);
        self.entries.push(Scheduled {
            due,
            sequence,
            item,
        });
    }

    /// Removes and returns every item due at or before `now`, ordered by due
    /// time and then by insertion order.
    pub fn drain_due(&mut self, now: Duration) -> Vec<T> {
        if !self.entries.iter().any(|entry| entry.due <= now) {
            return Vec::new();
        }

        let (mut ready, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| entry.due <= now);
        self.entries = pending;
        ready.sort_by_key(|entry| (entry.due, entry.sequence));
        ready.into_iter().map(|entry| entry.item).collect()
    }

    /// Number of items still waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
