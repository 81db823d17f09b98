//! Time sources for the controller

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

/// Supplies monotonic and wall-clock time
pub trait Clock: Send {
    /// Monotonic time, used for `elapsed`
    fn now(&self) -> Instant;

    /// Wall-clock time, used for log timestamps
    fn wall_now(&self) -> DateTime<Local>;
}

/// The real clocks
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to
///
/// Clones share the same offset, so a test can keep one handle and give the
/// other to the controller.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    wall_base: DateTime<Local>,
    offset_nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Start at the current real time
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            wall_base: Local::now(),
            offset_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Move both clocks forward
    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.offset_nanos.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Time advanced since creation
    pub fn offset(&self) -> Duration {
        Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset()
    }

    fn wall_now(&self) -> DateTime<Local> {
        let offset = chrono::Duration::from_std(self.offset()).unwrap_or(chrono::Duration::zero());
        self.wall_base + offset
    }
}
