//! Acquisition worker thread
//!
//! The worker owns the whole acquisition timeline. It runs session setup
//! (interval negotiation, log allocation, then the transport handshake, so a
//! log failure never reaches the device), then waits on its command channel
//! with the next tick as deadline:
//!
//! ```text
//! setup ──► loop {
//!             command before deadline? ──► start / stop / shutdown
//!             deadline reached?        ──► controller.tick(), schedule next
//!           }
//! ```
//!
//! Nothing else touches the controller, the session or the log file, so no
//! locks are needed. Updates to the UI never block: a UI that stops draining
//! its channel cannot stall ticks or logging.

use std::path::PathBuf;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;
use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, AppState};
use crate::error::{LoggerError, Result};
use crate::presentation::Presenter;
use crate::session::{allocate_log_path, negotiate_interval, Session};
use crate::transport::DeviceTransport;

use super::channel::{
    channels, AcquisitionCommand, AcquisitionMessage, ChannelPresenter, ChannelPrompter,
    FrontendHandle, WorkerChannels,
};
use super::clock::{Clock, SystemClock};
use super::controller::AcquisitionController;
use super::ticker::Ticker;

/// How often statistics are pushed to the UI
const STATS_INTERVAL: Duration = Duration::from_millis(500);

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// Acquisition ran and the operator closed the session
    Completed,
    /// The operator aborted during setup
    Cancelled,
    /// Setup failed
    Failed(String),
}

impl SessionOutcome {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            SessionOutcome::Completed | SessionOutcome::Cancelled => 0,
            SessionOutcome::Failed(_) => 1,
        }
    }
}

/// Runs one session on its own thread
pub struct AcquisitionWorker<T> {
    transport: T,
    config: AppConfig,
    app_state: AppState,
    /// Where to remember the interval and log path; `None` skips saving
    state_path: Option<PathBuf>,
    channels: WorkerChannels,
}

impl<T: DeviceTransport> AcquisitionWorker<T> {
    /// Create a worker and the frontend handle talking to it
    pub fn new(transport: T, config: AppConfig, app_state: AppState) -> (Self, FrontendHandle) {
        let (channels, frontend) = channels();
        (
            Self {
                transport,
                config,
                app_state,
                state_path: None,
                channels,
            },
            frontend,
        )
    }

    /// Persist the accepted interval and log path to `path`
    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = Some(path.into());
        self
    }

    /// Run the session to completion
    pub fn run(self) -> SessionOutcome {
        tracing::info!("Acquisition worker started ({})", self.transport.describe());

        let presenter = ChannelPresenter::new(self.channels.messages.clone());
        let outcome = self.run_session(presenter);

        match &outcome {
            SessionOutcome::Failed(reason) => tracing::error!("Session failed: {}", reason),
            other => tracing::info!("Session ended: {:?}", other),
        }
        outcome
    }

    fn run_session(mut self, mut presenter: ChannelPresenter) -> SessionOutcome {
        let default_interval = self
            .app_state
            .preferred_interval(self.config.acquisition.default_interval_secs);
        let interval = {
            let mut prompter = ChannelPrompter::new(&self.channels);
            negotiate_interval(&mut prompter, default_interval)
        };
        let Some(interval) = interval else {
            presenter.finish(SessionOutcome::Cancelled);
            return SessionOutcome::Cancelled;
        };

        // The log must exist before the device is touched
        let clock = SystemClock;
        let started_at = clock.wall_now();
        let log = match allocate_log_path(
            &self.config.storage.data_dir,
            &self.config.device.name,
            started_at,
        ) {
            Ok(log) => log,
            Err(e) => return fail(&mut presenter, e.with_context("Creating measurement log")),
        };

        if let Err(e) = self.transport.setup() {
            tracing::warn!("Device setup failed; {} keeps only its header", log.path().display());
            return fail(&mut presenter, e);
        }

        let session = Session::new(log, clock.now(), started_at);
        self.remember(interval, session.log_path().to_path_buf());
        presenter.session_started(session.log_path(), interval);

        let controller = AcquisitionController::new(
            self.transport,
            clock,
            session,
            self.config.acquisition.read_timeout(),
        )
        .with_failure_alert_threshold(self.config.acquisition.failure_alert_threshold);

        let outcome = run_loop(controller, &self.channels, &mut presenter, interval);
        presenter.finish(outcome.clone());
        outcome
    }

    fn remember(&mut self, interval: Duration, log_path: PathBuf) {
        self.app_state.last_interval_secs = Some(interval.as_secs_f64());
        self.app_state.last_log_path = Some(log_path);

        if let Some(path) = &self.state_path {
            if let Err(e) = self.app_state.save_to(path) {
                tracing::warn!("Failed to save app state: {}", e);
            }
        }
    }
}

impl<T: DeviceTransport + 'static> AcquisitionWorker<T> {
    /// Run the worker on a named thread
    pub fn spawn(self) -> Result<JoinHandle<SessionOutcome>> {
        std::thread::Builder::new()
            .name("acquisition".to_string())
            .spawn(move || self.run())
            .map_err(|e| LoggerError::Channel(format!("Failed to spawn worker thread: {}", e)))
    }
}

fn fail(presenter: &mut ChannelPresenter, error: LoggerError) -> SessionOutcome {
    let message = error.to_string();
    presenter.fatal(&message);
    presenter.finish(SessionOutcome::Failed(message.clone()));
    SessionOutcome::Failed(message)
}

/// Tick until the frontend shuts down
fn run_loop<T: DeviceTransport, C: Clock>(
    mut controller: AcquisitionController<T, C>,
    channels: &WorkerChannels,
    presenter: &mut ChannelPresenter,
    interval: Duration,
) -> SessionOutcome {
    let mut ticker = Ticker::new(interval, Instant::now());
    let mut last_stats = Instant::now();

    loop {
        match channels.commands.recv_deadline(ticker.deadline()) {
            Ok(AcquisitionCommand::Start) => {
                controller.start(presenter);
            }
            Ok(AcquisitionCommand::Stop) => {
                controller.stop(presenter);
            }
            Ok(AcquisitionCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                controller.tick(presenter);
                ticker.advance(Instant::now());

                if last_stats.elapsed() >= STATS_INTERVAL {
                    presenter.try_send(AcquisitionMessage::Stats(controller.stats().clone()));
                    last_stats = Instant::now();
                }
            }
        }
        presenter.flush();
    }

    log_summary(&controller, ticker.fired(), presenter.dropped(), presenter.pending());
    SessionOutcome::Completed
}

fn log_summary<T, C>(
    controller: &AcquisitionController<T, C>,
    ticks: u64,
    dropped: u64,
    pending: usize,
) where
    T: DeviceTransport,
    C: Clock,
{
    let session = controller.session();
    let stats = controller.stats();
    let duration = chrono::Local::now().signed_duration_since(session.started_at());

    tracing::info!(
        "Session summary: {} readings ({} logged), {} gaps, {} no-data, {} failures \
         (longest streak {}), {} ticks, {}s, log {}",
        session.readings_count(),
        session.logged_rows(),
        stats.gaps,
        stats.no_data,
        stats.failures,
        stats.longest_failure_streak,
        ticks,
        duration.num_seconds(),
        session.log_path().display()
    );
    if dropped > 0 || pending > 0 {
        tracing::debug!(
            "{} status messages dropped, {} updates still queued for the UI",
            dropped,
            pending
        );
    }
}
