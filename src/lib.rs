//! ASUS Zenbook Duo helpers for Linux.
//!
//! Two independent pieces:
//!
//! - keyboard backlight control over a HID SET_REPORT on the detachable
//!   keyboard's USB interface ([`BrightnessController`]);
//! - a presence monitor that polls the USB listing and switches the
//!   display layout when the keyboard is docked or detached
//!   ([`PresenceMonitor`]).
//!
//! # Quick Start
//!
//! ```no_run
//! use zenbook_duo_linux::{BrightnessController, BrightnessLevel};
//!
//! let level: BrightnessLevel = "medium".parse()?;
//! BrightnessController::new()?.set_brightness(level)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod backlight;
mod device;
mod display;
mod error;
mod hid;
mod level;
pub mod logging;
mod monitor;
mod presence;
pub mod protocol;

pub use backlight::{BrightnessController, ShortWritePolicy};
pub use device::{DeviceDescriptor, DeviceOpener, HidInterface, UsbBus, UsbHidSession};
pub use display::{
    CommandRunner, DisplayCommandSpec, DisplayReconfigurator, ProcessRunner,
    ReconfigureOutcome, SessionKind,
};
pub use error::{CommandError, DuoError, LevelRejection};
pub use hid::HidReport;
pub use level::BrightnessLevel;
pub use monitor::{MonitorConfig, PresenceMonitor};
pub use presence::{
    EnumerationSnapshot, Lsusb, PresenceEvent, PresenceState, PresenceStateMachine,
    UsbEnumerator, is_target_present,
};
