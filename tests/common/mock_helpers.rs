//! Scripted transport and recording presenter

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use caliper_logger::error::{LoggerError, Result};
use caliper_logger::types::{AcquisitionState, ReadOutcome, SeriesEntry};
use caliper_logger::{DeviceTransport, Presenter};

/// One scripted answer of [`ScriptedTransport`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Value(f64),
    NoData,
    Fail,
}

/// Transport replaying a fixed script
///
/// Once the script is exhausted it answers `NoData`, or the fallback value
/// if one was given.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Step>>>,
    reads: Arc<Mutex<usize>>,
    setups: Arc<Mutex<usize>>,
    fallback: Option<f64>,
    fail_setup: bool,
}

impl ScriptedTransport {
    pub fn new(steps: &[Step]) -> Self {
        Self {
            script: Arc::new(Mutex::new(steps.iter().copied().collect())),
            ..Default::default()
        }
    }

    /// Transport that reads `value` forever
    pub fn endless(value: f64) -> Self {
        Self {
            fallback: Some(value),
            ..Default::default()
        }
    }

    /// Make `setup` report a missing device
    pub fn failing_setup(mut self) -> Self {
        self.fail_setup = true;
        self
    }

    /// Number of reads so far (shared between clones)
    pub fn reads(&self) -> usize {
        *self.reads.lock().unwrap()
    }

    /// Number of `setup` calls so far (shared between clones)
    pub fn setups(&self) -> usize {
        *self.setups.lock().unwrap()
    }
}

impl DeviceTransport for ScriptedTransport {
    fn setup(&mut self) -> Result<()> {
        *self.setups.lock().unwrap() += 1;
        if self.fail_setup {
            return Err(LoggerError::DeviceNotFound {
                vendor_id: 0x0FE7,
                product_id: 0x4001,
            });
        }
        Ok(())
    }

    fn read(&mut self, _timeout: Duration) -> Result<ReadOutcome> {
        *self.reads.lock().unwrap() += 1;
        match self.script.lock().unwrap().pop_front() {
            Some(Step::Value(v)) => Ok(ReadOutcome::Value(v)),
            Some(Step::NoData) => Ok(ReadOutcome::NoData),
            None => Ok(self.fallback.map_or(ReadOutcome::NoData, ReadOutcome::Value)),
            Some(Step::Fail) => Err(LoggerError::Communication("scripted failure".into())),
        }
    }

    fn describe(&self) -> String {
        "Scripted".to_string()
    }
}

/// Presenter remembering everything it was told
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub entries: Vec<SeriesEntry>,
    pub counter: usize,
    pub states: Vec<AcquisitionState>,
    pub errors: Vec<String>,
    pub streaks: Vec<u32>,
    pub started: Option<(PathBuf, Duration)>,
    pub fatal: Option<String>,
}

impl Presenter for RecordingPresenter {
    fn render(&mut self, entries: &[SeriesEntry]) {
        self.entries.extend_from_slice(entries);
    }

    fn update_counter(&mut self, readings: usize) {
        self.counter = readings;
    }

    fn state_changed(&mut self, state: AcquisitionState) {
        self.states.push(state);
    }

    fn report_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn failure_streak(&mut self, consecutive: u32) {
        self.streaks.push(consecutive);
    }

    fn session_started(&mut self, log_path: &Path, interval: Duration) {
        self.started = Some((log_path.to_path_buf(), interval));
    }

    fn fatal(&mut self, message: &str) {
        self.fatal = Some(message.to_string());
    }
}
