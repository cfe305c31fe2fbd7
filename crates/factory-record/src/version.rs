//! Packed version word decoding.
//!
//! The base reports its revisions as one 64-bit word laid out as
//! `0xHHHH_FFFF_SSSSSSSS`:
//!
//! - bits 63..48: hardware revision
//! - bits 47..32: firmware revision
//! - bits 31..0: software build number
//!
//! Any word decodes; there is no "not yet read" sentinel, an untouched
//! version slot simply decodes to `0/0/0`.

use std::fmt;
use std::str::FromStr;

const FIRMWARE_SHIFT: u32 = 32;
const HARDWARE_SHIFT: u32 = 48;

/// Packed hardware/firmware/software version word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VersionWord(pub i64);

impl VersionWord {
    /// Pack the three revision fields into a word.
    pub const fn pack(hardware: u16, firmware: u16, software: u32) -> Self {
        let bits = ((hardware as u64) << HARDWARE_SHIFT)
            | ((firmware as u64) << FIRMWARE_SHIFT)
            | software as u64;
        Self(bits.cast_signed())
    }

    /// Raw word as stored in the device table.
    pub const fn raw(self) -> i64 {
        self.0
    }

    const fn bits(self) -> u64 {
        self.0.cast_unsigned()
    }

    /// Hardware revision (top 16 bits).
    pub const fn hardware(self) -> u16 {
        (self.bits() >> HARDWARE_SHIFT) as u16
    }

    /// Firmware revision (next 16 bits).
    pub const fn firmware(self) -> u16 {
        ((self.bits() >> FIRMWARE_SHIFT) & 0xFFFF) as u16
    }

    /// Software build number (low 32 bits).
    pub const fn software(self) -> u32 {
        (self.bits() & 0xFFFF_FFFF) as u32
    }

    /// Decimal `hardware{sep}firmware{sep}software`.
    pub fn format(self, separator: char) -> String {
        format!(
            "{}{separator}{}{separator}{}",
            self.hardware(),
            self.firmware(),
            self.software()
        )
    }
}

impl From<i64> for VersionWord {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for VersionWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format('/'))
    }
}

/// Returned when a raw version word cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid version word '{input}': {reason}")]
pub struct VersionParseError {
    /// Rejected input
    pub input: String,
    /// Parser message
    pub reason: String,
}

impl FromStr for VersionWord {
    type Err = VersionParseError;

    /// Accepts a signed decimal word or a `0x`-prefixed hex word (up to 64 bits).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16).map(u64::cast_signed),
            None => trimmed.parse::<i64>(),
        };
        parsed.map(Self).map_err(|err| VersionParseError {
            input: s.to_string(),
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_fields() {
        let word = VersionWord(0x0001_0002_0000_0003);
        assert_eq!(word.hardware(), 1);
        assert_eq!(word.firmware(), 2);
        assert_eq!(word.software(), 3);
        assert_eq!(word.format('/'), "1/2/3");
        assert_eq!(word.to_string(), "1/2/3");
    }

    #[test]
    fn test_zero_word_decodes_to_zeros() {
        assert_eq!(VersionWord::default().format(','), "0,0,0");
    }

    #[test]
    fn test_high_bit_set_decodes_unsigned() {
        let word = VersionWord(-1);
        assert_eq!(word.format('.'), "65535.65535.4294967295");
    }

    #[test]
    fn test_pack_matches_layout() {
        let word = VersionWord::pack(0x1234, 0xABCD, 0xDEAD_BEEF);
        assert_eq!(word.raw().cast_unsigned(), 0x1234_ABCD_DEAD_BEEF);
        assert_eq!(word.hardware(), 0x1234);
        assert_eq!(word.firmware(), 0xABCD);
        assert_eq!(word.software(), 0xDEAD_BEEF);
    }

    #[test]
    fn test_parse_decimal_and_hex() -> Result<(), VersionParseError> {
        assert_eq!("281483566645251".parse::<VersionWord>()?.format('/'), "1/2/3");
        assert_eq!("0x0001000200000003".parse::<VersionWord>()?.format('/'), "1/2/3");
        assert_eq!("0xFFFF_0000_0000_0000".parse::<VersionWord>()?.hardware(), 0xFFFF);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = "v1.2.3".parse::<VersionWord>();
        assert!(matches!(err, Err(VersionParseError { ref input, .. }) if input == "v1.2.3"));
    }
}
