//! Seams between the acquisition engine and whatever shows it to the operator
//!
//! The engine never touches widgets. It pushes series updates through a
//! [`Presenter`] and asks questions through a [`Prompter`]. The GUI
//! implements both over channels (see [`crate::acquisition::channel`]);
//! tests implement them with plain structs.

use std::path::Path;
use std::time::Duration;

use crate::types::{AcquisitionState, SeriesEntry};

/// Receives everything the operator should see during a session
pub trait Presenter {
    /// New series entries, in order, since the previous call
    fn render(&mut self, entries: &[SeriesEntry]);

    /// The readings counter changed
    fn update_counter(&mut self, readings: usize);

    /// The controller changed state
    fn state_changed(&mut self, _state: AcquisitionState) {}

    /// A non-fatal problem the operator should know about
    fn report_error(&mut self, message: &str);

    /// Reads have failed `consecutive` times in a row
    fn failure_streak(&mut self, consecutive: u32) {
        self.report_error(&format!("{} consecutive read failures", consecutive));
    }

    /// Setup finished and ticks are about to start
    fn session_started(&mut self, _log_path: &Path, _interval: Duration) {}

    /// Setup failed; the session will end
    fn fatal(&mut self, message: &str);
}

/// Asks the operator for input
pub trait Prompter {
    /// Ask for a number; `None` means the operator cancelled
    fn prompt_number(&mut self, title: &str, default: f64, min: f64, max: f64) -> Option<f64>;

    /// Ask a yes/no question
    fn confirm(&mut self, title: &str, message: &str) -> bool;
}
