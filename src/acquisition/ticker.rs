//! Fixed-period tick schedule
//!
//! Ticks are scheduled at `start + n * period`. When a tick runs late (a slow
//! transport call), the next one fires immediately and the schedule continues
//! from there; missed ticks are dropped, never queued.

use std::time::{Duration, Instant};

/// Schedule of acquisition ticks
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next: Instant,
    fired: u64,
}

impl Ticker {
    /// First tick one period after `start`
    pub fn new(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next: start + period,
            fired: 0,
        }
    }

    /// The tick period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// When the next tick is due
    pub fn deadline(&self) -> Instant {
        self.next
    }

    /// Whether the next tick is due at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next
    }

    /// Time left until the next tick
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// Record that a tick fired and schedule the next one
    ///
    /// `now` is the time the tick finished.
    pub fn advance(&mut self, now: Instant) {
        self.fired += 1;
        self.next = (self.next + self.period).max(now);
    }

    /// Number of ticks fired
    pub fn fired(&self) -> u64 {
        self.fired
    }
}
