//! HID output report for the keyboard backlight.
//!
//! Every report is [`HID_REPORT_SIZE`] bytes: the report ID, a three-byte
//! magic sequence, the brightness level at offset 4, and zero padding.
//! Layout: `5a ba c5 c4 [level] 00 00 00 00 00 00 00 00 00 00 00`

use std::fmt;

use crate::level::BrightnessLevel;
use crate::protocol::*;

/// A fully built backlight report, ready for SET_REPORT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HidReport([u8; HID_REPORT_SIZE]);

impl HidReport {
    /// Build the report for `level`.
    pub fn encode(level: BrightnessLevel) -> Self {
        let mut buf = [0u8; HID_REPORT_SIZE];
        buf[..HID_BACKLIGHT_HEADER.len()].copy_from_slice(&HID_BACKLIGHT_HEADER);
        buf[HID_LEVEL_OFFSET] = level.value();
        Self(buf)
    }

    pub fn as_bytes(&self) -> &[u8; HID_REPORT_SIZE] {
        &self.0
    }
}

impl fmt::Display for HidReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_level_has_fixed_header_and_padding() {
        for level in BrightnessLevel::ALL {
            let report = HidReport::encode(level);
            let bytes = report.as_bytes();
            assert_eq!(bytes.len(), 16);
            assert_eq!(bytes[..4], [0x5a, 0xba, 0xc5, 0xc4]);
            assert_eq!(bytes[4], level.value());
            assert!(bytes[5..].iter().all(|&b| b == 0), "padding not zero for {:?}", level);
        }
    }

    #[test]
    fn medium_report_bytes() {
        let report = HidReport::encode(BrightnessLevel::Medium);
        assert_eq!(
            report.as_bytes(),
            &[0x5a, 0xba, 0xc5, 0xc4, 0x02, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(report.to_string(), "5a ba c5 c4 02 00 00 00 00 00 00 00 00 00 00 00");
    }
}
