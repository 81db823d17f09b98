//! # caliper-logger: USB caliper poller
//!
//! Polls a digital caliper or indicator through its USB interface cable on a
//! fixed interval, plots the readings live and appends every reading to a
//! crash-safe CSV log.
//!
//! ## Architecture
//!
//! - **Acquisition**: an Idle/Running controller driven by a periodic tick on
//!   its own worker thread. It owns the transport, the session buffer and the
//!   log file.
//! - **Session**: append-only sample buffer with gap markers, and the CSV log
//!   sink with collision-free file naming.
//! - **Transport**: the USB-ITN cable over `nusb`, or a simulated caliper.
//! - **Frontend**: eframe/egui window with an egui_plot chart. It talks to the
//!   worker over crossbeam channels only.
//!
//! ## Configuration
//!
//! Settings live in `config.toml` in the platform data directory under
//! `dev.caliper-logger`:
//!
//! - **Linux**: `~/.local/share/dev.caliper-logger/`
//! - **macOS**: `~/Library/Application Support/dev.caliper-logger/`
//! - **Windows**: `%APPDATA%\dev.caliper-logger\`
//!
//! ## Example
//!
//! ```ignore
//! use caliper_logger::{
//!     acquisition::AcquisitionWorker,
//!     config::{AppConfig, AppState},
//!     frontend::CaliperApp,
//!     transport::select_transport,
//! };
//!
//! let config = AppConfig::load_or_default();
//! let transport = select_transport(&config.device)?;
//! let name = transport.describe();
//! let (worker, frontend) = AcquisitionWorker::new(transport, config.clone(), AppState::default());
//! let handle = worker.spawn()?;
//!
//! eframe::run_native(
//!     "Caliper Logger",
//!     eframe::NativeOptions::default(),
//!     Box::new(move |cc| Ok(Box::new(CaliperApp::new(cc, frontend, &config, name)))),
//! )?;
//!
//! let code = handle.join().map(|o| o.exit_code()).unwrap_or(1);
//! ```

pub mod acquisition;
pub mod config;
pub mod error;
pub mod frontend;
pub mod presentation;
pub mod session;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use acquisition::{AcquisitionController, AcquisitionWorker, SessionOutcome};
pub use config::{AppConfig, AppState};
pub use error::{LoggerError, Result};
pub use frontend::CaliperApp;
pub use presentation::{Presenter, Prompter};
pub use session::{LogSink, SampleBuffer, Session};
pub use transport::{select_transport, DeviceTransport};
pub use types::{AcquisitionState, ReadOutcome, Reading, SeriesEntry};
