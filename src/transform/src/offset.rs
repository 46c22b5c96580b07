//! Offset tokens such as `30s`, `2h` or `1d`.
//!
//! The leftmost run of digits immediately followed by a unit letter is taken,
//! so `"shift 2h"` decodes like `"2h"`. An empty (or all-whitespace) token is
//! a zero offset everywhere it is read.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, TransformError};

static OFFSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)([smhd])").expect("offset regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl OffsetUnit {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b's' => Some(OffsetUnit::Seconds),
            b'm' => Some(OffsetUnit::Minutes),
            b'h' => Some(OffsetUnit::Hours),
            b'd' => Some(OffsetUnit::Days),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            OffsetUnit::Seconds => 's',
            OffsetUnit::Minutes => 'm',
            OffsetUnit::Hours => 'h',
            OffsetUnit::Days => 'd',
        }
    }

    pub fn seconds(&self) -> i64 {
        match self {
            OffsetUnit::Seconds => 1,
            OffsetUnit::Minutes => 60,
            OffsetUnit::Hours => 60 * 60,
            OffsetUnit::Days => 24 * 60 * 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetSpec {
    pub value: u64,
    pub unit: OffsetUnit,
}

impl OffsetSpec {
    /// Milliseconds covered by this offset, `None` on overflow.
    pub fn as_millis(&self) -> Option<i64> {
        i64::try_from(self.value)
            .ok()?
            .checked_mul(1000)?
            .checked_mul(self.unit.seconds())
    }
}

impl FromStr for OffsetSpec {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || TransformError::MalformedOffsetSpec(s.to_string());

        let captures = OFFSET_RE.captures(s).ok_or_else(malformed)?;
        let value = captures[1].parse::<u64>().map_err(|_| malformed())?;
        let unit = captures[2]
            .bytes()
            .next()
            .and_then(OffsetUnit::from_byte)
            .ok_or_else(malformed)?;

        Ok(OffsetSpec { value, unit })
    }
}

impl fmt::Display for OffsetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.as_char())
    }
}

/// Decode an offset token into milliseconds.
pub fn decode(spec: &str) -> Result<i64> {
    if spec.trim().is_empty() {
        return Ok(0);
    }

    spec.parse::<OffsetSpec>()?
        .as_millis()
        .ok_or_else(|| TransformError::MalformedOffsetSpec(spec.to_string()))
}

/// [`decode`] for an optional token; a missing token is a zero offset.
pub fn decode_optional(spec: Option<&str>) -> Result<i64> {
    spec.map_or(Ok(0), decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_units() {
        assert_eq!(decode("30s").unwrap(), 30_000);
        assert_eq!(decode("5m").unwrap(), 300_000);
        assert_eq!(decode("2h").unwrap(), 7_200_000);
        assert_eq!(decode("1d").unwrap(), 86_400_000);
        assert_eq!(decode("7d").unwrap(), 604_800_000);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(
            decode("abc"),
            Err(TransformError::MalformedOffsetSpec("abc".to_string()))
        );
        assert!(decode("12").is_err());
        assert!(decode("h2").is_err());
        assert!(decode("2w").is_err());
    }

    #[test]
    fn test_decode_searches_within_token() {
        assert_eq!(decode("-1d").unwrap(), 86_400_000);
        assert_eq!(decode("12x3h").unwrap(), 10_800_000);
        assert_eq!(decode("10mins").unwrap(), 600_000);
    }

    #[test]
    fn test_leftmost_offset_wins() {
        assert_eq!(decode("1d2h").unwrap(), 86_400_000);
        assert_eq!(decode("at 90s or 2m").unwrap(), 90_000);
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(decode("").unwrap(), 0);
        assert_eq!(decode("  ").unwrap(), 0);
        assert_eq!(decode_optional(None).unwrap(), 0);
        assert_eq!(decode_optional(Some("1s")).unwrap(), 1000);
    }

    #[test]
    fn test_overflow_is_malformed() {
        assert!(decode("99999999999999999999d").is_err());
        assert!(decode("999999999999999d").is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let spec: OffsetSpec = "48h".parse().unwrap();

        assert_eq!(spec.value, 48);
        assert_eq!(spec.unit, OffsetUnit::Hours);
        assert_eq!(spec.to_string(), "48h");
    }
}
