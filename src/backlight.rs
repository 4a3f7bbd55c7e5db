//! One-shot keyboard backlight control.
//!
//! [`BrightnessController::set_brightness`] encodes the report, claims the
//! HID interface, sends a single SET_REPORT and releases the interface again
//! before returning, whatever the outcome.

use tracing::info;

use crate::device::{DeviceDescriptor, DeviceOpener, UsbBus, UsbHidSession};
use crate::error::DuoError;
use crate::hid::HidReport;
use crate::level::BrightnessLevel;
use crate::protocol::HID_INTERFACE;

/// What to do when the device acknowledges fewer bytes than the report length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShortWritePolicy {
    /// Log a warning and report success.
    #[default]
    Warn,
    /// Fail with [`DuoError::ShortTransfer`].
    Fail,
}

/// Sets the keyboard backlight level.
pub struct BrightnessController<O: DeviceOpener = UsbBus> {
    opener: O,
    descriptor: DeviceDescriptor,
    interface: u8,
    short_write: ShortWritePolicy,
}

impl BrightnessController<UsbBus> {
    /// Controller for the backlight on the real USB bus.
    pub fn new() -> Result<Self, DuoError> {
        Ok(Self::with_opener(UsbBus::new()?))
    }
}

impl<O: DeviceOpener> BrightnessController<O> {
    pub fn with_opener(opener: O) -> Self {
        Self {
            opener,
            descriptor: DeviceDescriptor::BACKLIGHT,
            interface: HID_INTERFACE,
            short_write: ShortWritePolicy::default(),
        }
    }

    pub fn short_write_policy(mut self, policy: ShortWritePolicy) -> Self {
        self.short_write = policy;
        self
    }

    /// Send `level` to the keyboard.
    ///
    /// Returns the number of bytes the device acknowledged.
    pub fn set_brightness(&self, level: BrightnessLevel) -> Result<usize, DuoError> {
        info!("Setting keyboard brightness to level {}", level);

        let report = HidReport::encode(level);
        let session = UsbHidSession::acquire(&self.opener, self.descriptor, self.interface)?;
        let written = session.transfer(&report)?;
        session.release();

        let expected = report.as_bytes().len();
        if written != expected {
            return match self.short_write {
                ShortWritePolicy::Warn => Ok(written),
                ShortWritePolicy::Fail => Err(DuoError::ShortTransfer { written, expected }),
            };
        }

        info!("Keyboard brightness set successfully");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::device::fake::{Call, FakeBus, Faults};

    #[test]
    fn medium_sends_exact_control_transfer() {
        let bus = FakeBus::new(Faults::default());
        let controller = BrightnessController::with_opener(bus.clone());
        let level: BrightnessLevel = "medium".parse().unwrap();

        assert_eq!(controller.set_brightness(level).unwrap(), 16);

        let mut expected = vec![0x5a, 0xba, 0xc5, 0xc4, 0x02];
        expected.resize(16, 0);
        assert_eq!(
            bus.calls(),
            vec![
                Call::Open(DeviceDescriptor { vendor_id: 0x0b05, product_id: 0x1b2c }),
                Call::KernelDriverActive(4),
                Call::Claim(4),
                Call::WriteControl {
                    request_type: 0x21,
                    request: 0x09,
                    value: 0x035a,
                    index: 4,
                    data: expected,
                    timeout: Duration::from_millis(1000),
                },
                Call::Release(4),
            ]
        );
    }

    #[test]
    fn errors_surface_after_release() {
        let bus = FakeBus::new(Faults {
            driver_active: Some(Ok(true)),
            write: Some(rusb::Error::Access),
            ..Faults::default()
        });
        let controller = BrightnessController::with_opener(bus.clone());

        let err = controller.set_brightness(BrightnessLevel::High).unwrap_err();
        assert!(matches!(err, DuoError::PermissionDenied { .. }));

        let calls = bus.calls();
        assert_eq!(&calls[calls.len() - 2..], &[Call::Release(4), Call::Attach(4)]);
    }

    #[test]
    fn missing_device_surfaces_not_found() {
        let bus = FakeBus::new(Faults {
            missing: true,
            ..Faults::default()
        });
        let err = BrightnessController::with_opener(bus)
            .set_brightness(BrightnessLevel::Off)
            .unwrap_err();
        assert!(matches!(err, DuoError::DeviceNotFound { vendor_id: 0x0b05, product_id: 0x1b2c }));
    }

    #[test]
    fn short_write_policy() {
        let faults = Faults {
            short_write: Some(10),
            ..Faults::default()
        };

        let lenient = BrightnessController::with_opener(FakeBus::new(faults.clone()));
        assert_eq!(lenient.set_brightness(BrightnessLevel::Low).unwrap(), 10);

        let bus = FakeBus::new(faults);
        let strict = BrightnessController::with_opener(bus.clone()).short_write_policy(ShortWritePolicy::Fail);
        let err = strict.set_brightness(BrightnessLevel::Low).unwrap_err();
        assert!(matches!(err, DuoError::ShortTransfer { written: 10, expected: 16 }));
        assert_eq!(bus.count(|c| matches!(c, Call::Release(_))), 1);
    }
}
