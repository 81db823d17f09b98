//! One-time session setup: interval negotiation and log allocation
//!
//! Both steps run before the first tick. Interval negotiation talks to the
//! operator through a [`Prompter`]; log allocation claims a fresh CSV file.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::config::{MAX_INTERVAL_SECS, MIN_INTERVAL_SECS};
use crate::error::Result;
use crate::presentation::Prompter;

use super::log_sink::{session_base_name, LogSink};

/// Title of the interval prompt
pub const INTERVAL_PROMPT_TITLE: &str = "Polling Interval";

/// Title of the retry confirmation
pub const RETRY_TITLE: &str = "Invalid Interval";

/// Why a prompt answer was not accepted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntervalRejection {
    /// The operator dismissed the prompt
    Cancelled,
    /// Zero, negative or not a number
    NotPositive(f64),
}

impl IntervalRejection {
    /// Message shown when asking whether to try again
    pub fn retry_message(&self) -> String {
        match self {
            IntervalRejection::Cancelled => {
                "No interval was entered. Do you want to try again?".to_string()
            }
            IntervalRejection::NotPositive(v) => format!(
                "{} is not a valid interval; it must be greater than zero. Do you want to try again?",
                v
            ),
        }
    }
}

/// Validate a prompt answer
///
/// Only strictly positive, finite values are accepted. The upper and lower
/// practical bounds are the prompt's business.
pub fn validate_interval(answer: Option<f64>) -> std::result::Result<Duration, IntervalRejection> {
    match answer {
        None => Err(IntervalRejection::Cancelled),
        Some(v) if v.is_finite() && v > 0.0 => Ok(Duration::from_secs_f64(v)),
        Some(v) => Err(IntervalRejection::NotPositive(v)),
    }
}

/// Ask the operator for a polling interval until one is valid
///
/// Returns `None` if the operator gives up, which ends the session without
/// an error.
pub fn negotiate_interval<P>(prompter: &mut P, default_secs: f64) -> Option<Duration>
where
    P: Prompter + ?Sized,
{
    loop {
        let answer = prompter.prompt_number(
            INTERVAL_PROMPT_TITLE,
            default_secs,
            MIN_INTERVAL_SECS,
            MAX_INTERVAL_SECS,
        );

        match validate_interval(answer) {
            Ok(interval) => {
                tracing::info!("Polling interval set to {:?}", interval);
                return Some(interval);
            }
            Err(rejection) => {
                tracing::debug!("Interval rejected: {:?}", rejection);
                if !prompter.confirm(RETRY_TITLE, &rejection.retry_message()) {
                    tracing::info!("Interval entry aborted by operator");
                    return None;
                }
            }
        }
    }
}

/// Claim a fresh log file for a session starting at `started_at`
///
/// The returned sink has already written and synced the header row.
pub fn allocate_log_path(
    directory: &Path,
    device_name: &str,
    started_at: DateTime<Local>,
) -> Result<LogSink> {
    let base_name = session_base_name(device_name, started_at);
    LogSink::create_unique(directory, &base_name)
}
