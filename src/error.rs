//! Error handling for caliper-logger
//!
//! This module defines the crate error type and a Result alias used
//! throughout the acquisition engine, the transports and the frontend.

use thiserror::Error;

/// Main error type for caliper-logger operations
#[derive(Error, Debug)]
pub enum LoggerError {
    /// No USB device with the configured vendor/product id is attached
    #[error("Device {vendor_id:04x}:{product_id:04x} not found")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    /// The device is attached but bound to a driver we cannot talk through
    #[error("Driver not bound: {0}")]
    DriverNotBound(String),

    /// Errors opening or configuring the USB device
    #[error("USB error: {0}")]
    Usb(String),

    /// Errors during the vendor setup handshake
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// A read could not be completed because the link misbehaved
    #[error("Communication error: {0}")]
    Communication(String),

    /// Errors writing the measurement log
    #[error("Log sink error: {0}")]
    LogSink(String),

    /// CSV encoding errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to channel communication
    #[error("Channel error: {0}")]
    Channel(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<LoggerError>,
    },
}

impl LoggerError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        LoggerError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error only affects the current tick
    ///
    /// Transient errors are reported to the operator and acquisition carries
    /// on with the next tick. Everything else ends the session.
    pub fn is_transient(&self) -> bool {
        match self {
            LoggerError::Communication(_) | LoggerError::LogSink(_) | LoggerError::Csv(_) => true,
            LoggerError::WithContext { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}

/// Result type alias for caliper-logger operations
pub type Result<T> = std::result::Result<T, LoggerError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| LoggerError::Io(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| LoggerError::Io(e).with_context(f()))
    }
}
