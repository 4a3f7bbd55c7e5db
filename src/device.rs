//! USB device discovery and the claim/release lifecycle of the HID interface.
//!
//! [`UsbHidSession::acquire`] locates the backlight controller by
//! vendor/product ID, detaches the kernel driver if one is bound, and claims
//! the interface. The [`Drop`] impl releases the interface and, only if this
//! session detached it, reattaches the kernel driver. A session never
//! outlives a single brightness change.

use std::time::Duration;

use rusb::{Context, DeviceHandle, UsbContext};
use tracing::{debug, warn};

use crate::error::DuoError;
use crate::hid::HidReport;
use crate::protocol::*;

/// Vendor/product pair identifying a USB device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceDescriptor {
    /// The keyboard backlight controller.
    pub const BACKLIGHT: Self = Self {
        vendor_id: VENDOR_ID,
        product_id: PRODUCT_ID,
    };
}

/// The libusb operations a session needs from an opened device.
///
/// Implemented for [`rusb::DeviceHandle`]; tests substitute a recording fake.
pub trait HidInterface {
    fn kernel_driver_active(&self, iface: u8) -> rusb::Result<bool>;
    fn detach_kernel_driver(&mut self, iface: u8) -> rusb::Result<()>;
    fn attach_kernel_driver(&mut self, iface: u8) -> rusb::Result<()>;
    fn claim_interface(&mut self, iface: u8) -> rusb::Result<()>;
    fn release_interface(&mut self, iface: u8) -> rusb::Result<()>;
    fn write_control(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &[u8],
        timeout: Duration,
    ) -> rusb::Result<usize>;
}

impl<T: UsbContext> HidInterface for DeviceHandle<T> {
    fn kernel_driver_active(&self, iface: u8) -> rusb::Result<bool> {
        DeviceHandle::kernel_driver_active(self, iface)
    }

    fn detach_kernel_driver(&mut self, iface: u8) -> rusb::Result<()> {
        DeviceHandle::detach_kernel_driver(self, iface)
    }

    fn attach_kernel_driver(&mut self, iface: u8) -> rusb::Result<()> {
        DeviceHandle::attach_kernel_driver(self, iface)
    }

    fn claim_interface(&mut self, iface: u8) -> rusb::Result<()> {
        DeviceHandle::claim_interface(self, iface)
    }

    fn release_interface(&mut self, iface: u8) -> rusb::Result<()> {
        DeviceHandle::release_interface(self, iface)
    }

    fn write_control(
        &self,
        request_type: u8,
        request: u8,
        value: u16,
        index: u16,
        buf: &[u8],
        timeout: Duration,
    ) -> rusb::Result<usize> {
        DeviceHandle::write_control(self, request_type, request, value, index, buf, timeout)
    }
}

/// Finds and opens a device by descriptor.
pub trait DeviceOpener {
    type Handle: HidInterface;

    /// Open the first enumerated device matching `descriptor`.
    ///
    /// Returns [`DuoError::DeviceNotFound`] when nothing matches.
    fn open(&self, descriptor: DeviceDescriptor) -> Result<Self::Handle, DuoError>;
}

/// The real USB bus, backed by a libusb context.
pub struct UsbBus {
    context: Context,
}

impl UsbBus {
    pub fn new() -> Result<Self, DuoError> {
        let context = Context::new().map_err(|e| DuoError::usb("initialize libusb", e))?;
        Ok(Self { context })
    }
}

impl DeviceOpener for UsbBus {
    type Handle = DeviceHandle<Context>;

    fn open(&self, descriptor: DeviceDescriptor) -> Result<Self::Handle, DuoError> {
        let devices = self
            .context
            .devices()
            .map_err(|e| DuoError::usb("enumerate devices", e))?;

        for device in devices.iter() {
            let desc = match device.device_descriptor() {
                Ok(d) => d,
                Err(_) => continue,
            };
            if desc.vendor_id() != descriptor.vendor_id || desc.product_id() != descriptor.product_id {
                continue;
            }

            debug!(
                "Found {:04x}:{:04x} on bus {} address {}",
                descriptor.vendor_id,
                descriptor.product_id,
                device.bus_number(),
                device.address()
            );
            return device.open().map_err(|e| DuoError::usb("open device", e));
        }

        Err(DuoError::DeviceNotFound {
            vendor_id: descriptor.vendor_id,
            product_id: descriptor.product_id,
        })
    }
}

/// Exclusive ownership of one claimed HID interface.
///
/// Dropping the session releases the interface and reattaches the kernel
/// driver if `acquire` detached it. Release runs on every exit path,
/// including an `acquire` that fails part way through.
pub struct UsbHidSession<H: HidInterface> {
    handle: H,
    interface: u8,
    detached_kernel_driver: bool,
}

impl<H: HidInterface> UsbHidSession<H> {
    /// Open the device matching `descriptor` and claim `interface`.
    pub fn acquire<O>(opener: &O, descriptor: DeviceDescriptor, interface: u8) -> Result<Self, DuoError>
    where
        O: DeviceOpener<Handle = H>,
    {
        let handle = opener.open(descriptor)?;

        // From here on the session owns the handle, so any early return
        // below still goes through Drop.
        let mut session = Self {
            handle,
            interface,
            detached_kernel_driver: false,
        };

        let driver_active = match session.handle.kernel_driver_active(interface) {
            Ok(active) => active,
            // Platforms without kernel drivers.
            Err(rusb::Error::NotSupported) => false,
            Err(e) => return Err(DuoError::usb("query kernel driver", e)),
        };

        if driver_active {
            session
                .handle
                .detach_kernel_driver(interface)
                .map_err(|e| DuoError::usb("detach kernel driver", e))?;
            session.detached_kernel_driver = true;
            debug!("Detached kernel driver from interface {}", interface);
        }

        session
            .handle
            .claim_interface(interface)
            .map_err(|e| DuoError::usb("claim interface", e))?;
        debug!("Claimed USB interface {}", interface);

        Ok(session)
    }

    /// Whether `acquire` detached a kernel driver that release must reattach.
    pub fn detached_kernel_driver(&self) -> bool {
        self.detached_kernel_driver
    }

    /// Send `report` with a class SET_REPORT request to the claimed interface.
    ///
    /// Returns the number of bytes the device acknowledged. A short write is
    /// logged but not treated as an error here.
    pub fn transfer(&self, report: &HidReport) -> Result<usize, DuoError> {
        let bytes = report.as_bytes();
        let written = self
            .handle
            .write_control(
                HID_REQUEST_TYPE_OUT,
                HID_SET_REPORT,
                HID_REPORT_VALUE,
                u16::from(self.interface),
                bytes,
                USB_TIMEOUT,
            )
            .map_err(|e| DuoError::usb("send SET_REPORT", e))?;

        if written != bytes.len() {
            warn!("Only {} bytes sent out of {}", written, bytes.len());
        }

        Ok(written)
    }

    /// Release the interface now instead of at end of scope.
    pub fn release(self) {
        drop(self);
    }
}

impl<H: HidInterface> Drop for UsbHidSession<H> {
    fn drop(&mut self) {
        match self.handle.release_interface(self.interface) {
            Ok(()) => debug!("Released USB interface {}", self.interface),
            Err(e) => warn!("Failed to release USB interface {}: {}", self.interface, e),
        }

        if self.detached_kernel_driver {
            match self.handle.attach_kernel_driver(self.interface) {
                Ok(()) => debug!("Reattached kernel driver to interface {}", self.interface),
                Err(e) => warn!("Failed to reattach kernel driver to interface {}: {}", self.interface, e),
            }
        }
    }
}
