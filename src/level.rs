//! Keyboard backlight brightness levels.

use std::fmt;
use std::str::FromStr;

use crate::error::{DuoError, LevelRejection};

/// One of the four backlight steps supported by the keyboard.
///
/// Parsing accepts either the numeric value (`0`..=`3`) or a level name
/// (`off`, `low`, `medium`, `high`, case-insensitive). Numeric parsing is
/// tried first and ignores surrounding whitespace; input that is not an
/// integer falls through to the names, which must match exactly apart from
/// case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BrightnessLevel {
    Off = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}

impl BrightnessLevel {
    pub const ALL: [BrightnessLevel; 4] = [Self::Off, Self::Low, Self::Medium, Self::High];

    /// Raw value written into the HID report.
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn from_value(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "off" => Some(Self::Off),
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl FromStr for BrightnessLevel {
    type Err = DuoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Surrounding whitespace is tolerated on numbers only, never on names.
        let digits = s.trim();
        if is_integer(digits) {
            return digits
                .parse::<i64>()
                .ok()
                .and_then(|n| u8::try_from(n).ok())
                .and_then(Self::from_value)
                .ok_or_else(|| DuoError::InvalidLevel {
                    input: s.to_string(),
                    reason: LevelRejection::OutOfRange(digits.to_string()),
                });
        }

        Self::from_name(&s.to_lowercase()).ok_or_else(|| DuoError::InvalidLevel {
            input: s.to_string(),
            reason: LevelRejection::Unrecognized,
        })
    }
}

/// Optionally signed, all ASCII digits, of any width.
fn is_integer(s: &str) -> bool {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for BrightnessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value(), self.name())
    }
}
