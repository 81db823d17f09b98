//! Configuration sections
//!
//! Each section of `config.toml` maps to one struct here. All fields carry
//! serde defaults so a partial or older config file still loads.
//!
//! # Main Types
//!
//! - [`DeviceConfig`] - Which instrument to open and through which transport
//! - [`SimulatedConfig`] - Behaviour of the simulated caliper
//! - [`AcquisitionConfig`] - Polling interval defaults, read timeout, alerting
//! - [`StorageConfig`] - Where measurement logs are written
//! - [`UiConfig`] - Plot and window preferences

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::{
    default_data_dir, DEFAULT_DEVICE_NAME, DEFAULT_FAILURE_ALERT_THRESHOLD,
    DEFAULT_INTERVAL_SECS, DEFAULT_PRODUCT_ID, DEFAULT_READ_TIMEOUT_SECS, DEFAULT_VENDOR_ID,
};

/// Transport used to talk to the instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// USB-ITN interface cable
    #[default]
    Usb,
    /// Simulated caliper (requires the `mock-device` feature)
    Simulated,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Usb => write!(f, "USB"),
            TransportKind::Simulated => write!(f, "Simulated"),
        }
    }
}

/// Instrument selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Name used in log file names and the window title
    #[serde(default = "default_device_name")]
    pub name: String,

    /// USB vendor id of the interface cable
    #[serde(default = "default_vendor_id")]
    pub vendor_id: u16,

    /// USB product id of the interface cable
    #[serde(default = "default_product_id")]
    pub product_id: u16,

    /// Transport implementation
    #[serde(default)]
    pub transport: TransportKind,

    /// Settings for `transport = "simulated"`
    #[serde(default)]
    pub simulated: SimulatedConfig,
}

fn default_device_name() -> String {
    DEFAULT_DEVICE_NAME.to_string()
}

fn default_vendor_id() -> u16 {
    DEFAULT_VENDOR_ID
}

fn default_product_id() -> u16 {
    DEFAULT_PRODUCT_ID
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: default_device_name(),
            vendor_id: DEFAULT_VENDOR_ID,
            product_id: DEFAULT_PRODUCT_ID,
            transport: TransportKind::default(),
            simulated: SimulatedConfig::default(),
        }
    }
}

/// How simulated values evolve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulatedPattern {
    /// Always the same value
    Constant { value: f64 },
    /// Grows by `step` on every read
    Ramp { start: f64, step: f64 },
    /// Sine wave over wall time since setup
    Sine {
        period_secs: f64,
        amplitude: f64,
        offset: f64,
    },
    /// Random walk with steps in `[-step, step]`, clamped to `[min, max]`
    RandomWalk { step: f64, min: f64, max: f64 },
}

impl Default for SimulatedPattern {
    fn default() -> Self {
        SimulatedPattern::RandomWalk {
            step: 0.005,
            min: 9.5,
            max: 10.5,
        }
    }
}

/// `[device.simulated]`
///
/// ```toml
/// [device.simulated]
/// noise = 0.002
/// failure_every = 50
///
/// [device.simulated.pattern]
/// kind = "sine"
/// period_secs = 10.0
/// amplitude = 0.25
/// offset = 10.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SimulatedConfig {
    /// Amplitude of uniform noise added to every value
    #[serde(default)]
    pub noise: f64,

    /// Answer "no data" on every nth read (0 disables)
    #[serde(default)]
    pub no_data_every: u64,

    /// Fail on every nth read (0 disables)
    #[serde(default)]
    pub failure_every: u64,

    #[serde(default)]
    pub pattern: SimulatedPattern,
}

/// Polling behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Interval offered by the first prompt when no previous run is remembered
    #[serde(default = "default_interval_secs")]
    pub default_interval_secs: f64,

    /// How long a single device read may block
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: f64,

    /// Consecutive read failures before the operator gets an escalated alert
    #[serde(default = "default_failure_alert_threshold")]
    pub failure_alert_threshold: u32,
}

fn default_interval_secs() -> f64 {
    DEFAULT_INTERVAL_SECS
}

fn default_read_timeout_secs() -> f64 {
    DEFAULT_READ_TIMEOUT_SECS
}

fn default_failure_alert_threshold() -> u32 {
    DEFAULT_FAILURE_ALERT_THRESHOLD
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            default_interval_secs: DEFAULT_INTERVAL_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            failure_alert_threshold: DEFAULT_FAILURE_ALERT_THRESHOLD,
        }
    }
}

impl AcquisitionConfig {
    /// Read timeout as a Duration, clamped to something the USB stack accepts
    pub fn read_timeout(&self) -> Duration {
        let secs = if self.read_timeout_secs.is_finite() && self.read_timeout_secs > 0.0 {
            self.read_timeout_secs
        } else {
            DEFAULT_READ_TIMEOUT_SECS
        };
        Duration::from_secs_f64(secs)
    }
}

/// Measurement log location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory receiving one CSV file per session
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Plot and window preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Enable dark mode
    #[serde(default = "default_true")]
    pub dark_mode: bool,

    /// Line width for the measurement series
    #[serde(default = "default_line_width")]
    pub line_width: f32,

    /// Draw a marker at every reading
    #[serde(default = "default_true")]
    pub show_markers: bool,
}

fn default_true() -> bool {
    true
}

fn default_line_width() -> f32 {
    1.5
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            dark_mode: true,
            line_width: default_line_width(),
            show_markers: true,
        }
    }
}
