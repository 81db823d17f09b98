//! Device transports
//!
//! A transport owns the connection to the measuring instrument. It is set up
//! once before acquisition starts and then asked for one reading per tick.
//!
//! - [`usb_itn::UsbItnTransport`] - the USB-ITN interface cable
//! - [`simulated::SimulatedCaliper`] - a fake gauge (`mock-device` feature)
//!
//! The implementation is picked once at startup by [`select_transport`].

pub mod frame;
#[cfg(feature = "mock-device")]
pub mod simulated;
pub mod usb_itn;

use std::time::Duration;

use crate::config::{DeviceConfig, TransportKind};
use crate::error::Result;
use crate::types::ReadOutcome;

pub use usb_itn::{SetupRoutine, UsbItnTransport};

/// Connection to a measuring instrument
///
/// Errors from [`read`](DeviceTransport::read) are expected to be
/// [`Communication`](crate::error::LoggerError::Communication) errors; the
/// controller treats them as affecting only the current tick. Errors from
/// [`setup`](DeviceTransport::setup) end the session.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceTransport: Send {
    /// Open the device and run the vendor handshake
    fn setup(&mut self) -> Result<()>;

    /// Request one reading, waiting at most `timeout` for the answer
    fn read(&mut self, timeout: Duration) -> Result<ReadOutcome>;

    /// Human readable description for logs and the status bar
    fn describe(&self) -> String;
}

impl<T: DeviceTransport + ?Sized> DeviceTransport for Box<T> {
    fn setup(&mut self) -> Result<()> {
        (**self).setup()
    }

    fn read(&mut self, timeout: Duration) -> Result<ReadOutcome> {
        (**self).read(timeout)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Build the transport named by the device configuration
pub fn select_transport(config: &DeviceConfig) -> Result<Box<dyn DeviceTransport>> {
    match config.transport {
        TransportKind::Usb => Ok(Box::new(UsbItnTransport::new(
            config.vendor_id,
            config.product_id,
        ))),
        #[cfg(feature = "mock-device")]
        TransportKind::Simulated => Ok(Box::new(simulated::SimulatedCaliper::from_config(
            &config.simulated,
        ))),
        #[cfg(not(feature = "mock-device"))]
        TransportKind::Simulated => Err(crate::error::LoggerError::Config(
            "the simulated transport requires the `mock-device` feature".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_usb() {
        let config = DeviceConfig::default();
        let transport = select_transport(&config).unwrap();
        assert!(transport.describe().starts_with("USB-ITN"));
    }

    #[cfg(not(feature = "mock-device"))]
    #[test]
    fn test_simulated_requires_feature() {
        let config = DeviceConfig {
            transport: TransportKind::Simulated,
            ..DeviceConfig::default()
        };
        assert!(select_transport(&config).is_err());
    }

    #[test]
    fn test_boxed_transport_delegates() {
        let mut mock = MockDeviceTransport::new();
        mock.expect_read()
            .returning(|_| Ok(ReadOutcome::Value(3.0)));
        let mut boxed: Box<dyn DeviceTransport> = Box::new(mock);
        assert_eq!(
            boxed.read(Duration::from_secs(1)).unwrap(),
            ReadOutcome::Value(3.0)
        );
    }
}
