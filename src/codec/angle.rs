//! Angle codec - decimal ASCII payloads.
//!
//! The sender puts the angle in the payload as plain decimal digits, with no
//! padding and no terminator (`90` is `0x39 0x30`). The receiver reads at
//! most [`MAX_COMMAND_LEN`] bytes, takes the leading decimal integer and
//! accepts it only if it lies in `1..=180`.
//!
//! # Example
//!
//! ```
//! use angle_relay::codec::{Angle, AngleCodec};
//!
//! let angle = Angle::new(90).unwrap();
//! let payload = AngleCodec::encode(angle);
//! assert_eq!(payload, b"90");
//! assert_eq!(AngleCodec::decode(&payload).unwrap(), angle);
//!
//! assert!(AngleCodec::decode(b"181").is_err());
//! ```

use std::fmt;

use crate::error::{RelayError, Result};

/// Smallest angle the actuator accepts.
pub const MIN_ANGLE: u8 = 1;

/// Largest angle the actuator accepts.
pub const MAX_ANGLE: u8 = 180;

/// Payload bytes considered when decoding a command; the rest is ignored.
pub const MAX_COMMAND_LEN: usize = 9;

/// An actuator position in degrees, always within `1..=180`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Angle(u8);

impl Angle {
    pub const MIN: Self = Self(MIN_ANGLE);
    pub const MAX: Self = Self(MAX_ANGLE);

    /// Validate a raw integer.
    ///
    /// # Errors
    ///
    /// Returns `PayloadOutOfRange` outside `1..=180`.
    pub fn new(value: i64) -> Result<Self> {
        if (i64::from(MIN_ANGLE)..=i64::from(MAX_ANGLE)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(RelayError::PayloadOutOfRange(value))
        }
    }

    /// Degrees.
    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Angle {
    type Error = RelayError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Angle> for u8 {
    fn from(angle: Angle) -> Self {
        angle.0
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Codec between [`Angle`] and frame payload bytes.
pub struct AngleCodec;

impl AngleCodec {
    /// Encode an angle as decimal ASCII digits.
    #[inline]
    pub fn encode(angle: Angle) -> Vec<u8> {
        angle.0.to_string().into_bytes()
    }

    /// Decode a payload into an angle.
    ///
    /// Leading ASCII whitespace and a single sign are accepted; parsing stops
    /// at the first non-digit. A payload with no digits reads as 0.
    ///
    /// # Errors
    ///
    /// Returns `PayloadOutOfRange` if the value is not in `1..=180`.
    pub fn decode(payload: &[u8]) -> Result<Angle> {
        let command = &payload[..payload.len().min(MAX_COMMAND_LEN)];
        Angle::new(parse_leading_decimal(command))
    }
}

fn parse_leading_decimal(bytes: &[u8]) -> i64 {
    let mut iter = bytes
        .iter()
        .copied()
        .skip_while(u8::is_ascii_whitespace)
        .peekable();

    let negative = match iter.peek() {
        Some(b'-') => {
            iter.next();
            true
        }
        Some(b'+') => {
            iter.next();
            false
        }
        _ => false,
    };

    let value = iter
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, b| {
            acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
        });

    if negative {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_has_no_padding() {
        assert_eq!(AngleCodec::encode(Angle::new(1).unwrap()), b"1");
        assert_eq!(AngleCodec::encode(Angle::new(90).unwrap()), b"90");
        assert_eq!(AngleCodec::encode(Angle::new(180).unwrap()), b"180");
    }

    #[test]
    fn test_every_angle_survives_codec() {
        for value in 1..=180 {
            let angle = Angle::new(value).unwrap();
            assert_eq!(AngleCodec::decode(&AngleCodec::encode(angle)).unwrap(), angle);
        }
    }

    #[test]
    fn test_range_bounds() {
        assert_eq!(AngleCodec::decode(b"1").unwrap(), Angle::MIN);
        assert_eq!(AngleCodec::decode(b"180").unwrap(), Angle::MAX);

        for (payload, value) in [(&b"0"[..], 0i64), (&b"181"[..], 181), (&b"999"[..], 999)] {
            match AngleCodec::decode(payload) {
                Err(RelayError::PayloadOutOfRange(v)) => assert_eq!(v, value),
                other => panic!("expected out of range for {payload:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_non_numeric_reads_as_zero() {
        assert!(matches!(
            AngleCodec::decode(b""),
            Err(RelayError::PayloadOutOfRange(0))
        ));
        assert!(matches!(
            AngleCodec::decode(b"abc"),
            Err(RelayError::PayloadOutOfRange(0))
        ));
        assert!(matches!(
            AngleCodec::decode(&[0x00, 0x00, b'9', b'0']),
            Err(RelayError::PayloadOutOfRange(0))
        ));
    }

    #[test]
    fn test_lenient_prefix_parsing() {
        assert_eq!(AngleCodec::decode(b"  45").unwrap().get(), 45);
        assert_eq!(AngleCodec::decode(b"+45").unwrap().get(), 45);
        assert_eq!(AngleCodec::decode(b"45deg").unwrap().get(), 45);
        assert_eq!(AngleCodec::decode(b"045").unwrap().get(), 45);
        assert!(matches!(
            AngleCodec::decode(b"-45"),
            Err(RelayError::PayloadOutOfRange(-45))
        ));
    }

    #[test]
    fn test_command_is_clamped() {
        // Only the first 9 bytes count.
        assert_eq!(AngleCodec::decode(b"000000001999").unwrap().get(), 1);
        assert!(matches!(
            AngleCodec::decode(b"1234567890123"),
            Err(RelayError::PayloadOutOfRange(123_456_789))
        ));
    }

    #[test]
    fn test_angle_conversions() {
        let angle = Angle::try_from(77i64).unwrap();
        assert_eq!(u8::from(angle), 77);
        assert_eq!(angle.to_string(), "77");
        assert!(Angle::try_from(-1i64).is_err());
    }
}
