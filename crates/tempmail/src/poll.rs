//! Poll scheduling
//!
//! The schedule decides when the next inbox poll may start. It enforces a
//! fixed cadence between polls, refuses to start a poll while one is in
//! flight, and can be cancelled for teardown. Time is passed in explicitly
//! so the type stays pure and testable without timers.

use chrono::{DateTime, Utc};

/// Cadence and in-flight gate for periodic inbox polls
#[derive(Debug, Clone)]
pub struct PollSchedule {
    interval_secs: u64,
    last_started_at: Option<DateTime<Utc>>,
    in_flight: bool,
    cancelled: bool,
}

impl PollSchedule {
    /// Create a schedule with the given seconds between polls
    pub fn new(interval_secs: u64) -> Self {
        Self {
            interval_secs,
            last_started_at: None,
            in_flight: false,
            cancelled: false,
        }
    }

    /// Whether a periodic poll may start at `now`.
    ///
    /// True when the schedule is live, nothing is in flight, and at least
    /// one interval has passed since the last poll started (a schedule
    /// that has never polled is immediately due).
    pub fn due(&self, now: DateTime<Utc>) -> bool {
        if self.cancelled || self.in_flight {
            return false;
        }
        match self.last_started_at {
            Some(last) => (now - last).num_seconds() >= self.interval_secs as i64,
            None => true,
        }
    }

    /// Claim the poll slot if a periodic poll is due. At most one claim
    /// succeeds until [`finish`](Self::finish) releases it.
    pub fn try_begin(&mut self, now: DateTime<Utc>) -> bool {
        if !self.due(now) {
            return false;
        }
        self.last_started_at = Some(now);
        self.in_flight = true;
        true
    }

    /// Claim the poll slot regardless of cadence (manual refresh). Still
    /// refuses while a poll is in flight or after cancellation.
    pub fn begin_immediate(&mut self, now: DateTime<Utc>) -> bool {
        if self.cancelled || self.in_flight {
            return false;
        }
        self.last_started_at = Some(now);
        self.in_flight = true;
        true
    }

    /// Release the poll slot once the request has resolved
    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    /// Stop the schedule; no further polls will be due
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Reactivate a cancelled schedule, restarting the cadence at `now`
    pub fn resume(&mut self, now: DateTime<Utc>) {
        self.cancelled = false;
        self.last_started_at = Some(now);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }
}
