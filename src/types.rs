//! Core data types for caliper-logger
//!
//! This module contains the fundamental data structures shared by the
//! acquisition engine, the transports and the frontend.
//!
//! # Main Types
//!
//! - [`Reading`] - A single successful instrument sample
//! - [`GapMarker`] - A discontinuity left in the series when acquisition stops
//! - [`SeriesEntry`] - One entry of the sample buffer (reading or gap)
//! - [`ReadOutcome`] - What a transport returns from a single poll
//! - [`AcquisitionState`] - The controller's Idle/Running state

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timestamp format used in the measurement log
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// A single instrument value captured during a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Instrument value in millimetres
    pub value: f64,
    /// Wall-clock time of capture
    pub wall_timestamp: DateTime<Local>,
    /// Time since session start
    pub elapsed: Duration,
}

impl Reading {
    /// Create a new reading
    pub fn new(value: f64, wall_timestamp: DateTime<Local>, elapsed: Duration) -> Self {
        Self {
            value,
            wall_timestamp,
            elapsed,
        }
    }

    /// The timestamp as written to the measurement log
    pub fn timestamp_string(&self) -> String {
        self.wall_timestamp.format(LOG_TIMESTAMP_FORMAT).to_string()
    }
}

/// Marks a stop in acquisition; never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapMarker {
    /// Time since session start at which acquisition stopped
    pub elapsed: Duration,
}

/// An entry in the sample buffer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SeriesEntry {
    Reading(Reading),
    Gap(GapMarker),
}

impl SeriesEntry {
    /// Time since session start for this entry
    pub fn elapsed(&self) -> Duration {
        match self {
            SeriesEntry::Reading(r) => r.elapsed,
            SeriesEntry::Gap(g) => g.elapsed,
        }
    }

    /// The reading, if this entry is one
    pub fn as_reading(&self) -> Option<&Reading> {
        match self {
            SeriesEntry::Reading(r) => Some(r),
            SeriesEntry::Gap(_) => None,
        }
    }

    /// Check if this entry is a gap marker
    pub fn is_gap(&self) -> bool {
        matches!(self, SeriesEntry::Gap(_))
    }
}

/// Result of one transport poll that did not fail
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadOutcome {
    /// The instrument returned a value
    Value(f64),
    /// Momentary absence of a value (timeout, instrument-side error frame)
    NoData,
}

/// State of the acquisition controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AcquisitionState {
    /// Not polling; ticks are ignored
    #[default]
    Idle,
    /// Polling the device on every tick
    Running,
}

impl AcquisitionState {
    /// Check if currently running
    pub fn is_running(&self) -> bool {
        matches!(self, AcquisitionState::Running)
    }

    /// Display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            AcquisitionState::Idle => "Idle",
            AcquisitionState::Running => "Running",
        }
    }
}

impl std::fmt::Display for AcquisitionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
