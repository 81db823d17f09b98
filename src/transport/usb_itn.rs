//! USB-ITN interface cable transport
//!
//! Talks to a gauge through the vendor USB interface cable using `nusb`.
//!
//! # Protocol
//!
//! - **Driver check**: vendor IN request `0x02`, 1 byte. Fails if the device is
//!   still bound to the HID class driver.
//! - **Handshake**: vendor OUT request `0x01` with value `0xA5A5`, then vendor
//!   IN request `0x02`.
//! - **Read**: vendor OUT request `0x03` carrying `"1\r"`, then one transfer on
//!   the interrupt IN endpoint of interface 0. See [`super::frame`] for the
//!   response format.
//!
//! # Platform setup
//!
//! On Linux and macOS the HID kernel driver is detached before claiming the
//! interface. On Windows the device must already be bound to WinUSB (for
//! example with Zadig), so the interface is claimed directly and a failed
//! reset is tolerated. The routine is picked once by
//! [`SetupRoutine::for_platform`].

use std::time::{Duration, Instant};

use nusb::transfer::{ControlIn, ControlOut, ControlType, In, Interrupt, Recipient};
use nusb::{Device, Interface, MaybeFuture};

use crate::error::{LoggerError, Result};
use crate::types::ReadOutcome;

use super::frame::{parse_frame, Frame};
use super::DeviceTransport;

/// Interface carrying the gauge data
const INTERFACE: u8 = 0;

/// Configuration selected during setup
const CONFIGURATION: u8 = 1;

/// Fallback interrupt IN endpoint if the descriptor cannot be inspected
const DEFAULT_IN_ENDPOINT: u8 = 0x81;

/// Bytes requested per response transfer
const RESPONSE_LEN: usize = 64;

/// Timeout for setup control transfers
const CONTROL_TIMEOUT: Duration = Duration::from_secs(1);

const REQUEST_INIT: u8 = 0x01;
const REQUEST_STATUS: u8 = 0x02;
const REQUEST_READ: u8 = 0x03;
const INIT_MAGIC: u16 = 0xA5A5;
const READ_COMMAND: &[u8] = b"1\r";

/// How the device is prepared before use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupRoutine {
    /// Detach the kernel HID driver, then claim the interface
    DetachKernelDriver,
    /// Claim the interface directly; the OS driver was replaced beforehand
    ClaimOnly,
}

impl SetupRoutine {
    /// The routine for the platform we were compiled for
    pub fn for_platform() -> Self {
        if cfg!(windows) {
            SetupRoutine::ClaimOnly
        } else {
            SetupRoutine::DetachKernelDriver
        }
    }
}

/// Connected cable state, present after a successful setup
struct Link {
    // Keeps the device open for as long as the interface is in use
    _device: Device,
    interface: Interface,
    endpoint: nusb::Endpoint<Interrupt, In>,
}

/// Transport for the USB-ITN cable
pub struct UsbItnTransport {
    vendor_id: u16,
    product_id: u16,
    routine: SetupRoutine,
    link: Option<Link>,
}

impl UsbItnTransport {
    /// Create a transport for the given ids using the platform setup routine
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self::with_routine(vendor_id, product_id, SetupRoutine::for_platform())
    }

    /// Create a transport with an explicit setup routine
    pub fn with_routine(vendor_id: u16, product_id: u16, routine: SetupRoutine) -> Self {
        Self {
            vendor_id,
            product_id,
            routine,
            link: None,
        }
    }

    fn open_device(&self) -> Result<Device> {
        let info = nusb::list_devices()
            .wait()
            .map_err(|e| LoggerError::Usb(format!("Failed to enumerate USB devices: {}", e)))?
            .find(|d| d.vendor_id() == self.vendor_id && d.product_id() == self.product_id)
            .ok_or(LoggerError::DeviceNotFound {
                vendor_id: self.vendor_id,
                product_id: self.product_id,
            })?;

        tracing::info!(
            "Found device {:04x}:{:04x} on bus {}",
            self.vendor_id,
            self.product_id,
            info.busnum()
        );

        info.open()
            .wait()
            .map_err(|e| LoggerError::Usb(format!("Failed to open device: {}", e)))
    }

    fn prepare(&self, device: &Device) -> Result<Interface> {
        match device.reset().wait() {
            Ok(()) => {}
            Err(e) if self.routine == SetupRoutine::ClaimOnly => {
                tracing::warn!("Device reset not available, continuing: {}", e);
            }
            Err(e) => return Err(LoggerError::Usb(format!("Failed to reset device: {}", e))),
        }

        if let Err(e) = device.set_configuration(CONFIGURATION).wait() {
            tracing::warn!("Could not select configuration {}: {}", CONFIGURATION, e);
        }

        let claimed = match self.routine {
            SetupRoutine::DetachKernelDriver => device.detach_and_claim_interface(INTERFACE).wait(),
            SetupRoutine::ClaimOnly => device.claim_interface(INTERFACE).wait(),
        };

        claimed.map_err(|e| {
            LoggerError::DriverNotBound(format!(
                "Failed to claim interface {}: {}. On Windows, install the WinUSB or libusb driver with Zadig.",
                INTERFACE, e
            ))
        })
    }

    fn in_endpoint_address(device: &Device) -> u8 {
        device
            .active_configuration()
            .ok()
            .and_then(|config| {
                config
                    .interface_alt_settings()
                    .filter(|alt| alt.interface_number() == INTERFACE)
                    .flat_map(|alt| alt.endpoints().map(|ep| ep.address()).collect::<Vec<_>>())
                    .find(|address| address & 0x80 != 0)
            })
            .unwrap_or(DEFAULT_IN_ENDPOINT)
    }

    /// Confirm the interface accepts vendor requests
    fn check_driver(interface: &Interface) -> Result<()> {
        interface
            .control_in(status_request(), CONTROL_TIMEOUT)
            .wait()
            .map(|_| ())
            .map_err(|e| {
                LoggerError::DriverNotBound(format!(
                    "Vendor check request failed ({}). The device is likely still using the HID driver; \
                     install libusb/WinUSB with Zadig.",
                    e
                ))
            })
    }

    fn handshake(interface: &Interface) -> Result<()> {
        interface
            .control_out(
                ControlOut {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request: REQUEST_INIT,
                    value: INIT_MAGIC,
                    index: 0,
                    data: &[],
                },
                CONTROL_TIMEOUT,
            )
            .wait()
            .map_err(|e| LoggerError::Handshake(format!("init request: {}", e)))?;

        interface
            .control_in(status_request(), CONTROL_TIMEOUT)
            .wait()
            .map_err(|e| LoggerError::Handshake(format!("status request: {}", e)))?;

        Ok(())
    }

    fn link_mut(&mut self) -> Result<&mut Link> {
        self.link
            .as_mut()
            .ok_or_else(|| LoggerError::Communication("transport not set up".to_string()))
    }
}

fn status_request() -> ControlIn {
    ControlIn {
        control_type: ControlType::Vendor,
        recipient: Recipient::Device,
        request: REQUEST_STATUS,
        value: 0,
        index: 0,
        length: 1,
    }
}

impl DeviceTransport for UsbItnTransport {
    fn setup(&mut self) -> Result<()> {
        let device = self.open_device()?;
        let interface = self.prepare(&device)?;

        Self::check_driver(&interface)?;
        Self::handshake(&interface)?;

        let address = Self::in_endpoint_address(&device);
        let endpoint = interface
            .endpoint::<Interrupt, In>(address)
            .map_err(|e| LoggerError::Usb(format!("Failed to open endpoint {:#04x}: {}", address, e)))?;

        tracing::info!(
            "USB-ITN ready (routine {:?}, endpoint {:#04x})",
            self.routine,
            address
        );

        self.link = Some(Link {
            _device: device,
            interface,
            endpoint,
        });
        Ok(())
    }

    fn read(&mut self, timeout: Duration) -> Result<ReadOutcome> {
        let started = Instant::now();
        let link = self.link_mut()?;

        link.interface
            .control_out(
                ControlOut {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request: REQUEST_READ,
                    value: 0,
                    index: 0,
                    data: READ_COMMAND,
                },
                timeout,
            )
            .wait()
            .map_err(|e| LoggerError::Communication(format!("read request: {}", e)))?;

        let buffer = link.endpoint.allocate(RESPONSE_LEN);
        link.endpoint.submit(buffer);

        let remaining = timeout.saturating_sub(started.elapsed());
        let Some(completion) = link.endpoint.wait_next_complete(remaining) else {
            link.endpoint.cancel_all();
            while link.endpoint.pending() > 0 {
                let _ = link.endpoint.wait_next_complete(CONTROL_TIMEOUT);
            }
            tracing::debug!("No response within {:?}", timeout);
            return Ok(ReadOutcome::NoData);
        };

        completion
            .status
            .map_err(|e| LoggerError::Communication(format!("response transfer: {}", e)))?;

        let bytes: &[u8] = &completion.buffer;
        match parse_frame(bytes) {
            Frame::Value(v) => Ok(ReadOutcome::Value(v)),
            Frame::InstrumentError(code) => {
                tracing::debug!("Instrument reported error code {}", code);
                Ok(ReadOutcome::NoData)
            }
            Frame::Unrecognized(text) => {
                tracing::debug!("Ignoring unrecognized response {:?}", text);
                Ok(ReadOutcome::NoData)
            }
        }
    }

    fn describe(&self) -> String {
        format!("USB-ITN {:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_routine() {
        let routine = SetupRoutine::for_platform();
        if cfg!(windows) {
            assert_eq!(routine, SetupRoutine::ClaimOnly);
        } else {
            assert_eq!(routine, SetupRoutine::DetachKernelDriver);
        }
    }

    #[test]
    fn test_read_before_setup_is_communication_error() {
        let mut transport = UsbItnTransport::new(0x0FE7, 0x4001);
        let err = transport.read(Duration::from_millis(10)).unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn test_describe() {
        let transport = UsbItnTransport::new(0x0FE7, 0x4001);
        assert_eq!(transport.describe(), "USB-ITN 0fe7:4001");
    }

    #[test]
    #[ignore = "requires a connected USB-ITN cable"]
    fn test_hardware_read() {
        let mut transport = UsbItnTransport::new(0x0FE7, 0x4001);
        transport.setup().unwrap();
        let _ = transport.read(Duration::from_secs(2)).unwrap();
    }
}
