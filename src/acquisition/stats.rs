//! Per-session acquisition statistics

use std::collections::VecDeque;
use std::time::Duration;

/// Number of recent read times kept for jitter calculation
const RECENT_WINDOW_SIZE: usize = 100;

/// Counters and read latency for one session
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionStats {
    /// Ticks that polled the device
    pub polls: u64,
    /// Polls that produced a reading
    pub values: u64,
    /// Polls that produced no data
    pub no_data: u64,
    /// Polls that failed
    pub failures: u64,
    /// Consecutive failures up to the latest poll
    pub failure_streak: u32,
    /// Longest failure streak seen
    pub longest_failure_streak: u32,
    /// Stop events (one gap marker each)
    pub gaps: u64,
    /// Total read time in microseconds
    pub total_read_time_us: u64,
    /// Last read time in microseconds
    pub last_read_time_us: u64,
    /// Minimum read time observed (microseconds)
    pub min_read_time_us: u64,
    /// Maximum read time observed (microseconds)
    pub max_read_time_us: u64,
    recent_read_times: VecDeque<u64>,
}

impl Default for AcquisitionStats {
    fn default() -> Self {
        Self {
            polls: 0,
            values: 0,
            no_data: 0,
            failures: 0,
            failure_streak: 0,
            longest_failure_streak: 0,
            gaps: 0,
            total_read_time_us: 0,
            last_read_time_us: 0,
            min_read_time_us: u64::MAX,
            max_read_time_us: 0,
            recent_read_times: VecDeque::with_capacity(RECENT_WINDOW_SIZE),
        }
    }
}

impl AcquisitionStats {
    /// A poll that returned a value
    pub fn record_value(&mut self, read_time: Duration) {
        self.values += 1;
        self.failure_streak = 0;
        self.record_poll(read_time);
    }

    /// A poll that returned no data
    pub fn record_no_data(&mut self, read_time: Duration) {
        self.no_data += 1;
        self.failure_streak = 0;
        self.record_poll(read_time);
    }

    /// A failed poll; returns the current failure streak
    pub fn record_failure(&mut self, read_time: Duration) -> u32 {
        self.failures += 1;
        self.failure_streak += 1;
        self.longest_failure_streak = self.longest_failure_streak.max(self.failure_streak);
        self.record_poll(read_time);
        self.failure_streak
    }

    /// A stop event
    pub fn record_gap(&mut self) {
        self.gaps += 1;
    }

    fn record_poll(&mut self, read_time: Duration) {
        let time_us = u64::try_from(read_time.as_micros()).unwrap_or(u64::MAX);
        self.polls += 1;
        self.total_read_time_us = self.total_read_time_us.saturating_add(time_us);
        self.last_read_time_us = time_us;
        self.min_read_time_us = self.min_read_time_us.min(time_us);
        self.max_read_time_us = self.max_read_time_us.max(time_us);

        self.recent_read_times.push_back(time_us);
        if self.recent_read_times.len() > RECENT_WINDOW_SIZE {
            self.recent_read_times.pop_front();
        }
    }

    /// Average read time in microseconds
    pub fn avg_read_time_us(&self) -> f64 {
        if self.polls == 0 {
            0.0
        } else {
            self.total_read_time_us as f64 / self.polls as f64
        }
    }

    /// Share of polls that produced a value, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.polls == 0 {
            100.0
        } else {
            (self.values as f64 / self.polls as f64) * 100.0
        }
    }

    /// Jitter (max - min) over the recent window in microseconds
    pub fn jitter_us(&self) -> u64 {
        let min = self.recent_read_times.iter().min().copied().unwrap_or(0);
        let max = self.recent_read_times.iter().max().copied().unwrap_or(0);
        max.saturating_sub(min)
    }
}
