//! Detachable keyboard presence detection.
//!
//! Presence is derived from a textual USB listing (`lsusb`): the keyboard
//! counts as attached when a single line carries both the vendor ID token
//! and one of the known name keywords. [`PresenceStateMachine`] turns the
//! per-poll observations into connect/disconnect edges.

use std::process::Command;

use tracing::{debug, warn};

/// Text listing of the USB devices attached at one poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumerationSnapshot(String);

impl EnumerationSnapshot {
    pub fn new(listing: impl Into<String>) -> Self {
        Self(listing.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.0.lines()
    }
}

/// Source of USB enumeration snapshots.
pub trait UsbEnumerator {
    /// Current listing. A failed enumeration yields an empty snapshot.
    fn snapshot(&mut self) -> EnumerationSnapshot;
}

/// Runs `lsusb` for every snapshot.
#[derive(Debug, Clone)]
pub struct Lsusb {
    program: String,
    args: Vec<String>,
}

impl Default for Lsusb {
    fn default() -> Self {
        Self {
            program: "lsusb".into(),
            args: Vec::new(),
        }
    }
}

impl UsbEnumerator for Lsusb {
    fn snapshot(&mut self) -> EnumerationSnapshot {
        let output = match Command::new(&self.program).args(&self.args).output() {
            Ok(output) => output,
            Err(e) => {
                warn!("Error running {}: {}", self.program, e);
                return EnumerationSnapshot::default();
            }
        };

        // A partial listing is still better than none.
        if !output.status.success() {
            warn!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        EnumerationSnapshot::new(String::from_utf8_lossy(&output.stdout))
    }
}

/// Whether some line of `snapshot` contains `vendor_hex` and at least one
/// of `keywords`. Matching is case-insensitive and per line; keywords are
/// only checked on lines that already matched the vendor.
pub fn is_target_present<S: AsRef<str>>(snapshot: &EnumerationSnapshot, vendor_hex: &str, keywords: &[S]) -> bool {
    let vendor = vendor_hex.to_lowercase();
    let keywords: Vec<String> = keywords.iter().map(|k| k.as_ref().to_lowercase()).collect();

    snapshot.lines().any(|line| {
        let line = line.to_lowercase();
        line.contains(&vendor) && keywords.iter().any(|k| line.contains(k.as_str()))
    })
}

/// Last known keyboard presence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PresenceState {
    /// Nothing observed yet.
    #[default]
    Unknown,
    Present,
    Absent,
}

impl PresenceState {
    pub fn from_present(present: bool) -> Self {
        if present { Self::Present } else { Self::Absent }
    }
}

/// A genuine presence edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceEvent {
    Connected,
    Disconnected,
}

/// Edge detector over successive presence observations.
///
/// The first observation seeds the state without an event; repeated
/// identical observations never emit.
#[derive(Debug, Default)]
pub struct PresenceStateMachine {
    state: PresenceState,
}

impl PresenceStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PresenceState {
        self.state
    }

    /// Feed one observation and return the edge it completes, if any.
    pub fn observe(&mut self, present: bool) -> Option<PresenceEvent> {
        let current = PresenceState::from_present(present);
        let event = match (self.state, current) {
            (PresenceState::Unknown, _) => {
                debug!("Seeding presence state with {:?}", current);
                None
            }
            (PresenceState::Absent, PresenceState::Present) => Some(PresenceEvent::Connected),
            (PresenceState::Present, PresenceState::Absent) => Some(PresenceEvent::Disconnected),
            _ => None,
        };
        self.state = current;
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{KEYBOARD_KEYWORDS, VENDOR_ID_HEX};

    const DOCKED: &str = "\
Bus 001 Device 001: ID 1d6b:0002 Linux Foundation 2.0 root hub
Bus 003 Device 004: ID 0b05:1b2c ASUSTek Computer, Inc. ASUS Zenbook Duo Keyboard
Bus 003 Device 002: ID 8087:0033 Intel Corp. AX211 Bluetooth
";

    fn present(listing: &str) -> bool {
        is_target_present(&EnumerationSnapshot::new(listing), VENDOR_ID_HEX, KEYBOARD_KEYWORDS)
    }

    #[test]
    fn docked_keyboard_is_detected() {
        assert!(present(DOCKED));
    }

    #[test]
    fn vendor_without_keyword_is_absent() {
        assert!(!present("Bus 003 Device 005: ID 0b05:1234 Generic Vendor Device"));
    }

    #[test]
    fn keywords_match_inside_words() {
        // "ASUSTek" contains "asus", so any ASUSTek line counts as the keyboard.
        assert!(present("Bus 003 Device 005: ID 0b05:19b6 ASUSTek Computer, Inc. N-KEY Device"));
    }

    #[test]
    fn keyword_with_other_vendor_is_absent() {
        assert!(!present("Bus 003 Device 006: ID 046d:c52b Logitech, Inc. Unifying Keyboard Receiver"));
    }

    #[test]
    fn vendor_and_keyword_must_share_a_line() {
        let listing = "\
Bus 003 Device 005: ID 0b05:1234 Generic Vendor Device
Bus 003 Device 006: ID 046d:c52b Logitech, Inc. Unifying Keyboard Receiver
";
        assert!(!present(listing));
    }

    #[test]
    fn matching_ignores_case() {
        assert!(present("Bus 003 Device 004: ID 0B05:1B2C PRIMAX KEYBOARD"));
        assert!(is_target_present(&EnumerationSnapshot::new("id 0b05:1b2c zenbook"), "0B05", &["ZenBook"]));
    }

    #[test]
    fn empty_snapshot_is_absent() {
        assert!(!present(""));
    }

    #[test]
    fn missing_enumerator_yields_empty_snapshot() {
        let mut lsusb = Lsusb {
            program: "/nonexistent/lsusb-for-tests".into(),
            args: Vec::new(),
        };
        assert_eq!(lsusb.snapshot(), EnumerationSnapshot::default());
    }

    #[cfg(unix)]
    #[test]
    fn failing_enumerator_keeps_partial_listing() {
        let mut lsusb = Lsusb {
            program: "sh".into(),
            args: vec![
                "-c".into(),
                "echo 'Bus 003 Device 004: ID 0b05:1b2c Zenbook Duo Keyboard'; echo 'lsusb: partial' >&2; exit 1".into(),
            ],
        };
        let snapshot = lsusb.snapshot();
        assert!(snapshot.as_str().contains("0b05:1b2c"));
        assert!(is_target_present(&snapshot, VENDOR_ID_HEX, KEYBOARD_KEYWORDS));
    }

    #[test]
    fn edges_fire_once_per_transition() {
        let mut machine = PresenceStateMachine::new();
        assert_eq!(machine.state(), PresenceState::Unknown);

        let events: Vec<_> = [false, true, true, false, true]
            .into_iter()
            .filter_map(|p| machine.observe(p))
            .collect();

        assert_eq!(
            events,
            vec![PresenceEvent::Connected, PresenceEvent::Disconnected, PresenceEvent::Connected]
        );
        assert_eq!(machine.state(), PresenceState::Present);
    }

    #[test]
    fn first_observation_only_seeds() {
        let mut machine = PresenceStateMachine::new();
        assert_eq!(machine.observe(true), None);
        assert_eq!(machine.state(), PresenceState::Present);
        assert_eq!(machine.observe(true), None);
        assert_eq!(machine.observe(false), Some(PresenceEvent::Disconnected));
    }
}
