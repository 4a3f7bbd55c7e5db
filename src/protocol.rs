//! Protocol constants for the Zenbook Duo keyboard backlight and the
//! detachable-keyboard presence monitor.
//!
//! All magic numbers live here so the rest of the codebase references named
//! constants instead of raw hex.

use std::time::Duration;

// ---------------------------------------------------------------------------
// USB device identifiers
// ---------------------------------------------------------------------------

/// ASUSTek vendor ID.
pub const VENDOR_ID: u16 = 0x0b05;

/// Keyboard backlight controller product ID.
pub const PRODUCT_ID: u16 = 0x1b2c;

// ---------------------------------------------------------------------------
// HID protocol: SET_REPORT on Interface 4
// ---------------------------------------------------------------------------

/// bmRequestType for host-to-device, class, interface request.
pub const HID_REQUEST_TYPE_OUT: u8 = 0x21;
/// HID SET_REPORT bRequest.
pub const HID_SET_REPORT: u8 = 0x09;
/// wValue for the backlight report (Report Type=Feature 0x03, Report ID=0x5A).
pub const HID_REPORT_VALUE: u16 = 0x035a;
/// HID interface number carrying the backlight report.
pub const HID_INTERFACE: u8 = 4;
/// Fixed report size; the payload is zero-padded to this length.
pub const HID_REPORT_SIZE: usize = 16;
/// Report ID in byte 0 of every report.
pub const HID_REPORT_ID: u8 = 0x5a;

/// Backlight report header: report ID followed by the fixed magic sequence.
pub const HID_BACKLIGHT_HEADER: [u8; 4] = [HID_REPORT_ID, 0xba, 0xc5, 0xc4];

/// Offset of the brightness byte inside the report.
pub const HID_LEVEL_OFFSET: usize = 4;

/// USB control transfer timeout.
pub const USB_TIMEOUT: Duration = Duration::from_millis(1000);

// ---------------------------------------------------------------------------
// Presence detection
// ---------------------------------------------------------------------------

/// Vendor ID as it appears in `lsusb` output.
pub const VENDOR_ID_HEX: &str = "0b05";

/// Device-name tokens identifying the detachable keyboard on an `lsusb` line.
pub const KEYBOARD_KEYWORDS: &[&str] = &["asus", "zenbook", "duo", "keyboard", "primax"];

/// Default enumeration poll interval.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound for a single display reconfiguration command.
pub const RECONFIGURE_TIMEOUT: Duration = Duration::from_secs(10);

/// Built-in panel kept active in every layout.
pub const PRIMARY_CONNECTOR: &str = "eDP-1";
/// Lower panel, covered by the keyboard when it is docked.
pub const SECONDARY_CONNECTOR: &str = "eDP-2";
