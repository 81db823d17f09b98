//! Configuration module for caliper-logger
//!
//! This module handles application configuration including:
//! - The TOML config file (device, acquisition, storage and UI sections)
//! - Application state persistence (last interval, last log file)
//!
//! # App Data Location
//!
//! Application data is stored in the platform-appropriate location:
//! - **Linux**: `~/.local/share/dev.caliper-logger/`
//! - **macOS**: `~/Library/Application Support/dev.caliper-logger/`
//! - **Windows**: `%APPDATA%\dev.caliper-logger\`
//!
//! # Files
//!
//! - `config.toml` - User-editable configuration, written with defaults on first run
//! - `app_state.json` - Values remembered between runs
//! - `logs/` - Diagnostic logs (not measurement data)
//!
//! Measurement CSV files go to [`StorageConfig::data_dir`], which defaults to a
//! folder in the user's documents directory.

pub mod settings;

pub use settings::*;

use crate::error::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "dev.caliper-logger";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// App state filename
pub const APP_STATE_FILE: &str = "app_state.json";

/// Diagnostic log directory name
pub const LOG_DIR: &str = "logs";

/// Default device name used in log file names
pub const DEFAULT_DEVICE_NAME: &str = "Mitutoyo";

/// USB-ITN cable vendor id
pub const DEFAULT_VENDOR_ID: u16 = 0x0FE7;

/// USB-ITN cable product id
pub const DEFAULT_PRODUCT_ID: u16 = 0x4001;

/// Default polling interval in seconds
pub const DEFAULT_INTERVAL_SECS: f64 = 1.0;

/// Smallest interval the prompt accepts
pub const MIN_INTERVAL_SECS: f64 = 0.001;

/// Largest interval the prompt accepts
pub const MAX_INTERVAL_SECS: f64 = 3600.0;

/// Default timeout for a single device read
pub const DEFAULT_READ_TIMEOUT_SECS: f64 = 2.0;

/// Default number of consecutive failures before alerting the operator
pub const DEFAULT_FAILURE_ALERT_THRESHOLD: u32 = 10;

/// Folder name for measurement logs inside the documents directory
pub const DATA_DIR_NAME: &str = "Caliper Measurements";

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        LoggerError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            LoggerError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Directory for diagnostic logs
pub fn log_dir() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(LOG_DIR))
}

/// Default directory for measurement logs
pub fn default_data_dir() -> PathBuf {
    dirs_next::document_dir()
        .map(|p| p.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("data"))
}

// ==================== App Config ====================

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default)]
    pub acquisition: AcquisitionConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        toml::from_str(&content).map_err(|e| {
            LoggerError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })
    }

    /// Save config file to disk
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LoggerError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| LoggerError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            LoggerError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    /// Load the config from the app data directory
    ///
    /// A missing file is created with defaults. Any other problem is logged
    /// and the defaults are used for this run.
    pub fn load_or_default() -> Self {
        let Some(path) = app_data_dir().map(|p| p.join(CONFIG_FILE)) else {
            tracing::warn!("Could not determine app data directory, using default config");
            return Self::default();
        };

        if !path.exists() {
            let config = Self::default();
            match config.save(&path) {
                Ok(()) => tracing::info!("Wrote default config to {:?}", path),
                Err(e) => tracing::warn!("Failed to write default config: {}", e),
            }
            return config;
        }

        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }
}

// ==================== App State ====================

/// Values remembered between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Version for future migration support
    #[serde(default = "default_app_state_version")]
    pub version: u32,

    /// Interval accepted in the previous run
    #[serde(default)]
    pub last_interval_secs: Option<f64>,

    /// Measurement log written by the previous run
    #[serde(default)]
    pub last_log_path: Option<PathBuf>,
}

fn default_app_state_version() -> u32 {
    1
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            version: 1,
            last_interval_secs: None,
            last_log_path: None,
        }
    }
}

impl AppState {
    /// Load app state from a file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| LoggerError::Config(format!("Failed to read app state: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| LoggerError::Config(format!("Failed to parse app state: {}", e)))
    }

    /// Save app state to a file
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| LoggerError::Config(format!("Failed to serialize app state: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| LoggerError::Config(format!("Failed to write app state: {}", e)))
    }

    /// Load app state from the default location, returning defaults on any error
    pub fn load_or_default() -> Self {
        let Some(path) = app_data_dir().map(|p| p.join(APP_STATE_FILE)) else {
            return Self::default();
        };

        Self::load_from(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load app state, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save app state to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(dir.join(APP_STATE_FILE))
    }

    /// Interval to offer as the prompt default
    ///
    /// Prefers the last accepted interval when it is still within bounds.
    pub fn preferred_interval(&self, fallback: f64) -> f64 {
        self.last_interval_secs
            .filter(|v| (MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(v))
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_toml_roundtrip_preserves_fields() {
        let mut config = AppConfig::default();
        config.device.name = "Bench".to_string();
        config.acquisition.default_interval_secs = 2.5;
        config.storage.data_dir = PathBuf::from("/tmp/measurements");

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: AppConfig = toml::from_str("[device]\nname = \"Digimatic\"\n").unwrap();
        assert_eq!(parsed.device.name, "Digimatic");
        assert_eq!(parsed.device.vendor_id, DEFAULT_VENDOR_ID);
        assert_eq!(parsed.device.product_id, DEFAULT_PRODUCT_ID);
        assert_eq!(parsed.acquisition, AcquisitionConfig::default());
    }

    #[test]
    fn test_simulated_section_parses() {
        let text = r#"
[device]
transport = "simulated"

[device.simulated]
noise = 0.002
failure_every = 7

[device.simulated.pattern]
kind = "sine"
period_secs = 5.0
amplitude = 0.2
offset = 10.0
"#;
        let parsed: AppConfig = toml::from_str(text).unwrap();
        let simulated = &parsed.device.simulated;
        assert_eq!(parsed.device.transport, TransportKind::Simulated);
        assert_eq!(simulated.noise, 0.002);
        assert_eq!(simulated.failure_every, 7);
        assert_eq!(simulated.no_data_every, 0);
        assert_eq!(
            simulated.pattern,
            SimulatedPattern::Sine {
                period_secs: 5.0,
                amplitude: 0.2,
                offset: 10.0
            }
        );

        let text = toml::to_string_pretty(&parsed).unwrap();
        assert_eq!(toml::from_str::<AppConfig>(&text).unwrap(), parsed);
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = AppConfig::default();
        config.acquisition.failure_alert_threshold = 3;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.acquisition.failure_alert_threshold, 3);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "device = 12").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, LoggerError::Config(_)));
    }

    #[test]
    fn test_app_state_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(APP_STATE_FILE);

        let state = AppState {
            last_interval_secs: Some(0.5),
            last_log_path: Some(PathBuf::from("a.csv")),
            ..Default::default()
        };
        state.save_to(&path).unwrap();

        assert_eq!(AppState::load_from(&path).unwrap(), state);
    }

    #[test]
    fn test_missing_app_state_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::load_from(dir.path().join("nope.json")).unwrap();
        assert_eq!(state, AppState::default());
    }

    #[test]
    fn test_preferred_interval() {
        let mut state = AppState::default();
        assert_eq!(state.preferred_interval(1.0), 1.0);

        state.last_interval_secs = Some(2.5);
        assert_eq!(state.preferred_interval(1.0), 2.5);

        state.last_interval_secs = Some(0.0);
        assert_eq!(state.preferred_interval(1.0), 1.0);
    }
}
