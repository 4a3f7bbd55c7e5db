//! Custom error types for the zenbook-duo-linux tools.
//!
//! Provides structured errors instead of `Box<dyn Error>`, so callers can
//! distinguish invalid input, a missing device, a permission problem, and
//! any other USB failure. The first three carry remediation text that is
//! shown to the user verbatim.

use std::fmt;
use std::process::ExitStatus;

use thiserror::Error;

/// Valid brightness inputs, listed in error messages.
pub const VALID_LEVELS: &str = "off, low, medium, high, 0, 1, 2, 3";

/// Why a brightness input was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelRejection {
    /// An integer, kept as typed, outside 0..=3.
    OutOfRange(String),
    /// Neither an integer nor a known level name.
    Unrecognized,
}

impl fmt::Display for LevelRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange(n) => write!(f, "numeric level must be between 0 and 3, got {}", n),
            Self::Unrecognized => f.write_str("unrecognized level name"),
        }
    }
}

/// Top-level error type for all backlight operations.
#[derive(Debug, Error)]
pub enum DuoError {
    /// The brightness input failed validation. Never reaches the device layer.
    #[error("Invalid brightness level '{input}': {reason}.\nValid options: {valid}", valid = VALID_LEVELS)]
    InvalidLevel {
        input: String,
        reason: LevelRejection,
    },

    /// No device with the expected vendor/product ID is enumerated.
    #[error("Device not found (Vendor ID: 0x{vendor_id:04X}, Product ID: 0x{product_id:04X})\n\
             Troubleshooting steps:\n\
             1. Verify the device is connected: lsusb | grep {vendor_id:04x}:{product_id:04x}\n\
             2. Run the setup script: ./setup.sh\n\
             3. Check USB permissions in /dev/bus/usb/")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    /// libusb reported an access-denied condition.
    #[error("Permission denied while trying to {stage} on the USB device.\n\
             This usually means USB permissions are not set up correctly.\n\
             Try running: ./setup.sh\n\
             Or check that you are in the 'plugdev' group: groups $USER\n\
             Original error: {source}")]
    PermissionDenied {
        stage: &'static str,
        #[source]
        source: rusb::Error,
    },

    /// Any other libusb failure while opening, claiming, or transferring.
    #[error("USB device operation failed ({stage}): {source}")]
    DeviceError {
        stage: &'static str,
        #[source]
        source: rusb::Error,
    },

    /// The device acknowledged fewer bytes than the report length.
    /// Only raised under [`ShortWritePolicy::Fail`](crate::ShortWritePolicy).
    #[error("Only {written} bytes sent out of {expected}")]
    ShortTransfer { written: usize, expected: usize },
}

impl DuoError {
    /// Classify a libusb error raised during `stage`.
    ///
    /// `Access` is reported separately because the remediation differs.
    pub(crate) fn usb(stage: &'static str, source: rusb::Error) -> Self {
        match source {
            rusb::Error::Access => Self::PermissionDenied { stage, source },
            source => Self::DeviceError { stage, source },
        }
    }
}

/// Failure of one external display-reconfiguration command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command line was empty.
    #[error("empty command line")]
    Empty,

    /// The program is not installed or not on `PATH`.
    #[error("command not found: {0}")]
    NotFound(String),

    /// The command did not finish within its time budget and was killed.
    #[error("timed out after {0:?}")]
    TimedOut(std::time::Duration),

    /// The command ran and exited unsuccessfully.
    #[error("exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    /// Spawning or waiting on the child process failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_maps_to_permission_denied() {
        let err = DuoError::usb("claim interface", rusb::Error::Access);
        assert!(matches!(err, DuoError::PermissionDenied { .. }));
        let msg = err.to_string();
        assert!(msg.contains("plugdev"));
        assert!(msg.contains("setup.sh"));
    }

    #[test]
    fn other_usb_errors_map_to_device_error() {
        for source in [rusb::Error::Busy, rusb::Error::Pipe, rusb::Error::Timeout, rusb::Error::Io] {
            assert!(matches!(DuoError::usb("transfer", source), DuoError::DeviceError { .. }));
        }
    }

    #[test]
    fn device_not_found_guides_operator() {
        let msg = DuoError::DeviceNotFound { vendor_id: 0x0b05, product_id: 0x1b2c }.to_string();
        assert!(msg.contains("0x0B05"));
        assert!(msg.contains("0x1B2C"));
        assert!(msg.contains("lsusb | grep 0b05:1b2c"));
        assert!(msg.contains("./setup.sh"));
    }

    #[test]
    fn invalid_level_lists_options() {
        let err = DuoError::InvalidLevel {
            input: "bright".into(),
            reason: LevelRejection::Unrecognized,
        };
        let msg = err.to_string();
        assert!(msg.contains("'bright'"));
        assert!(msg.contains(VALID_LEVELS));
    }
}
