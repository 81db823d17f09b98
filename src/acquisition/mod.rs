//! Acquisition engine
//!
//! Polls the instrument on a fixed period, records readings into the session
//! and forwards updates to the UI. Everything here runs on one worker thread.
//!
//! # Components
//!
//! - [`AcquisitionController`] - Idle/Running state machine with `start`/`stop`/`tick`
//! - [`Ticker`] - Fixed-period schedule with the overrun policy
//! - [`Clock`] - Time source ([`SystemClock`], or [`ManualClock`] in tests)
//! - [`AcquisitionStats`] - Counters, failure streaks and read latency
//! - [`AcquisitionWorker`] - Thread entry point running setup and the tick loop
//! - [`FrontendHandle`] - UI-side end of the worker channels
//!
//! # Example
//!
//! ```ignore
//! use caliper_logger::acquisition::AcquisitionWorker;
//! use caliper_logger::config::{AppConfig, AppState};
//! use caliper_logger::transport::select_transport;
//!
//! let config = AppConfig::load_or_default();
//! let transport = select_transport(&config.device)?;
//! let (worker, frontend) = AcquisitionWorker::new(transport, config, AppState::default());
//! let handle = worker.spawn()?;
//!
//! frontend.start();
//! for msg in frontend.drain() {
//!     // update the UI
//! }
//! frontend.shutdown();
//! let outcome = handle.join();
//! ```

pub mod channel;
pub mod clock;
pub mod controller;
pub mod stats;
pub mod ticker;
pub mod worker;

pub use channel::{
    channels, AcquisitionCommand, AcquisitionMessage, ChannelPresenter, ChannelPrompter,
    FrontendHandle, PromptReply, WorkerChannels,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{AcquisitionController, TickOutcome};
pub use stats::AcquisitionStats;
pub use ticker::Ticker;
pub use worker::{AcquisitionWorker, SessionOutcome};
