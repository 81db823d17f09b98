//! Test data builders

use std::path::Path;
use std::time::Duration;

use caliper_logger::acquisition::{AcquisitionController, ManualClock};
use caliper_logger::acquisition::Clock;
use caliper_logger::config::AppConfig;
use caliper_logger::session::{allocate_log_path, Session};

use super::mock_helpers::{ScriptedTransport, Step};

/// Builder for a controller over a scripted transport and a manual clock
pub struct ControllerBuilder {
    steps: Vec<Step>,
    device_name: String,
    read_timeout: Duration,
    alert_threshold: u32,
}

impl ControllerBuilder {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            device_name: "Mitutoyo".to_string(),
            read_timeout: Duration::from_secs(2),
            alert_threshold: 0,
        }
    }

    pub fn steps(mut self, steps: &[Step]) -> Self {
        self.steps = steps.to_vec();
        self
    }

    pub fn device_name(mut self, name: &str) -> Self {
        self.device_name = name.to_string();
        self
    }

    pub fn alert_threshold(mut self, threshold: u32) -> Self {
        self.alert_threshold = threshold;
        self
    }

    pub fn build(
        self,
        data_dir: &Path,
    ) -> (AcquisitionController<ScriptedTransport, ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let log = allocate_log_path(data_dir, &self.device_name, clock.wall_now()).unwrap();
        let session = Session::new(log, clock.now(), clock.wall_now());
        let controller = AcquisitionController::new(
            ScriptedTransport::new(&self.steps),
            clock.clone(),
            session,
            self.read_timeout,
        )
        .with_failure_alert_threshold(self.alert_threshold);
        (controller, clock)
    }
}

impl Default for ControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Config pointing the measurement log at `data_dir`
pub fn config_in(data_dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.data_dir = data_dir.to_path_buf();
    config.acquisition.default_interval_secs = 0.02;
    config
}
