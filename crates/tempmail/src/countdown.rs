//! Countdown for the mailbox expiry display
//!
//! Purely cosmetic: the provider controls actual mailbox lifetime, and
//! extending the countdown adds nothing on the provider side. Its one
//! functional effect is gating the periodic inbox poll, which stops when
//! the countdown reaches zero.

/// A decrementing timer driven by one-second ticks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining_secs: u64,
}

impl Countdown {
    /// Seconds added per extension (and the conventional initial value)
    pub const EXTENSION_SECS: u64 = 600;

    /// Create a countdown with the given number of seconds remaining
    pub fn new(secs: u64) -> Self {
        Self {
            remaining_secs: secs,
        }
    }

    /// Advance by one second; stays at zero once expired
    pub fn tick(&mut self) -> u64 {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        self.remaining_secs
    }

    /// Seconds left
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Whether the countdown has reached zero
    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    /// Add time; an expired countdown resumes
    pub fn extend(&mut self, secs: u64) {
        self.remaining_secs += secs;
    }

    /// Restart at the given value (a fresh mailbox)
    pub fn reset(&mut self, secs: u64) {
        self.remaining_secs = secs;
    }

    /// Format as "M:SS" for display
    pub fn display(&self) -> String {
        format!("{}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }
}
