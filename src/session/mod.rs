//! Session state and setup
//!
//! A session is one run of the program: one start time, one measurement log,
//! one sample buffer. It is created once setup succeeds and lives until the
//! acquisition worker exits.
//!
//! # Components
//!
//! - [`SampleBuffer`] - Append-only series of readings and gap markers
//! - [`LogSink`] - Durable CSV writer for successful readings
//! - [`setup`] - Interval negotiation and log allocation

pub mod buffer;
pub mod log_sink;
pub mod setup;

pub use buffer::SampleBuffer;
pub use log_sink::{session_base_name, LogSink, LogStorage, LOG_HEADER};
pub use setup::{allocate_log_path, negotiate_interval, validate_interval, IntervalRejection};

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use crate::error::Result;
use crate::types::Reading;

/// Everything one acquisition session owns
#[derive(Debug)]
pub struct Session {
    start_instant: Instant,
    started_at: DateTime<Local>,
    buffer: SampleBuffer,
    log: LogSink,
}

impl Session {
    /// Start a session with an already allocated log
    pub fn new(log: LogSink, start_instant: Instant, started_at: DateTime<Local>) -> Self {
        Self {
            start_instant,
            started_at,
            buffer: SampleBuffer::new(),
            log,
        }
    }

    /// Time since the session started
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start_instant)
    }

    /// Persist a reading, then buffer it
    ///
    /// The row is written first; if that fails the reading is not buffered,
    /// so the log always stays a subsequence of the buffer.
    pub fn record(&mut self, reading: Reading) -> Result<()> {
        self.log.append(&reading)?;
        self.buffer.push_reading(reading);
        Ok(())
    }

    /// Mark a discontinuity in the buffer (the log is untouched)
    pub fn mark_gap(&mut self, elapsed: Duration) {
        self.buffer.push_gap(elapsed);
    }

    /// The sample buffer
    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    /// Number of readings acquired
    pub fn readings_count(&self) -> usize {
        self.buffer.reading_count()
    }

    /// Path of the measurement log
    pub fn log_path(&self) -> &Path {
        self.log.path()
    }

    /// Number of rows in the measurement log
    pub fn logged_rows(&self) -> u64 {
        self.log.rows_written()
    }

    /// Wall-clock start time
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }
}
