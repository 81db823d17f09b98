//! The acquisition state machine
//!
//! [`AcquisitionController`] owns the transport, the clock and the session.
//! It has exactly three entry points, [`start`](AcquisitionController::start),
//! [`stop`](AcquisitionController::stop) and
//! [`tick`](AcquisitionController::tick), all guarded by one state variable.
//!
//! # Tick protocol
//!
//! While running, each tick:
//!
//! 1. computes `elapsed` since the session start
//! 2. asks the transport for a reading, bounded by the read timeout
//! 3. on a value: writes the log row, buffers the reading, and publishes the
//!    new series entries and counter
//! 4. on no data: does nothing
//! 5. on a failure: reports it and carries on; the next tick tries again
//!
//! A failed log append counts as a failure for that tick, and the reading is
//! not buffered, so the log stays in step with the buffer.

use std::time::Duration;

use crate::error::LoggerError;
use crate::presentation::Presenter;
use crate::session::Session;
use crate::transport::DeviceTransport;
use crate::types::{AcquisitionState, ReadOutcome, Reading};

use super::clock::{Clock, SystemClock};
use super::stats::AcquisitionStats;

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The controller was idle
    Skipped,
    /// A reading was logged and buffered
    Recorded(f64),
    /// The instrument had nothing to report
    NoData,
    /// The read or the log append failed
    Failed,
}

/// Idle/Running state machine driving one session
pub struct AcquisitionController<T, C = SystemClock> {
    transport: T,
    clock: C,
    session: Session,
    state: AcquisitionState,
    read_timeout: Duration,
    /// Zero disables the streak alert
    failure_alert_threshold: u32,
    stats: AcquisitionStats,
    /// Buffer entries already handed to the presenter
    published: usize,
}

impl<T: DeviceTransport, C: Clock> AcquisitionController<T, C> {
    /// Create an idle controller
    pub fn new(transport: T, clock: C, session: Session, read_timeout: Duration) -> Self {
        Self {
            transport,
            clock,
            session,
            state: AcquisitionState::Idle,
            read_timeout,
            failure_alert_threshold: 0,
            stats: AcquisitionStats::default(),
            published: 0,
        }
    }

    /// Alert the operator once `threshold` consecutive reads have failed
    pub fn with_failure_alert_threshold(mut self, threshold: u32) -> Self {
        self.failure_alert_threshold = threshold;
        self
    }

    /// Current state
    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    /// The session being acquired
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Statistics so far
    pub fn stats(&self) -> &AcquisitionStats {
        &self.stats
    }

    /// The transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Idle -> Running; no-op when already running
    pub fn start<P: Presenter + ?Sized>(&mut self, presenter: &mut P) -> bool {
        if self.state.is_running() {
            return false;
        }
        self.state = AcquisitionState::Running;
        tracing::info!("Acquisition started");
        presenter.state_changed(self.state);
        true
    }

    /// Running -> Idle, marking a gap; no-op when already idle
    pub fn stop<P: Presenter + ?Sized>(&mut self, presenter: &mut P) -> bool {
        if !self.state.is_running() {
            return false;
        }
        self.state = AcquisitionState::Idle;

        let elapsed = self.session.elapsed_at(self.clock.now());
        self.session.mark_gap(elapsed);
        self.stats.record_gap();
        tracing::info!("Acquisition stopped at {:.3}s", elapsed.as_secs_f64());

        self.publish(presenter);
        presenter.state_changed(self.state);
        true
    }

    /// Run one tick
    pub fn tick<P: Presenter + ?Sized>(&mut self, presenter: &mut P) -> TickOutcome {
        if !self.state.is_running() {
            return TickOutcome::Skipped;
        }

        let now = self.clock.now();
        let wall = self.clock.wall_now();
        let elapsed = self.session.elapsed_at(now);

        let result = self.transport.read(self.read_timeout);
        let read_time = self.clock.now().saturating_duration_since(now);

        match result {
            Ok(ReadOutcome::Value(value)) => {
                let reading = Reading::new(value, wall, elapsed);
                if let Err(e) = self.session.record(reading) {
                    return self.fail(e, read_time, presenter);
                }
                self.stats.record_value(read_time);
                tracing::debug!("{:.3}s: {}", elapsed.as_secs_f64(), value);
                self.publish(presenter);
                TickOutcome::Recorded(value)
            }
            Ok(ReadOutcome::NoData) => {
                self.stats.record_no_data(read_time);
                tracing::debug!("{:.3}s: no data", elapsed.as_secs_f64());
                TickOutcome::NoData
            }
            Err(e) => self.fail(e, read_time, presenter),
        }
    }

    fn fail<P: Presenter + ?Sized>(
        &mut self,
        error: LoggerError,
        read_time: Duration,
        presenter: &mut P,
    ) -> TickOutcome {
        let streak = self.stats.record_failure(read_time);
        tracing::warn!("Tick failed: {}", error);
        presenter.report_error(&error.to_string());

        if self.failure_alert_threshold > 0 && streak == self.failure_alert_threshold {
            tracing::warn!("{} consecutive read failures, still polling", streak);
            presenter.failure_streak(streak);
        }
        TickOutcome::Failed
    }

    /// Hand new series entries and the counter to the presenter
    fn publish<P: Presenter + ?Sized>(&mut self, presenter: &mut P) {
        let buffer = self.session.buffer();
        let new_entries = buffer.entries_since(self.published);
        if !new_entries.is_empty() {
            presenter.render(new_entries);
        }
        self.published = buffer.len();
        presenter.update_counter(buffer.reading_count());
    }
}
