//! Single-byte frame checksum.
//!
//! The checksum is `0xFF` minus the low byte of the sum of the frame data
//! (frame type through last payload byte). Adding the checksum to that sum
//! therefore always gives `0xFF` modulo 256.

use super::wire_format::{field, FRAME_DATA_OFFSET};

/// Value the frame data plus its checksum sums to.
pub const CHECKSUM_TARGET: u8 = 0xFF;

/// Compute the checksum over a frame data slice.
///
/// # Example
///
/// ```
/// use angle_relay::protocol::checksum;
///
/// assert_eq!(checksum::compute(&[]), 0xFF);
/// assert_eq!(checksum::compute(&[0x10, 0x01]), 0xEE);
/// ```
#[inline]
pub fn compute(data: &[u8]) -> u8 {
    CHECKSUM_TARGET.wrapping_sub(sum(data))
}

/// Check a frame data slice against its trailing checksum byte.
#[inline]
pub fn verify(data: &[u8], expected: u8) -> bool {
    sum(data).wrapping_add(expected) == CHECKSUM_TARGET
}

/// Checksummed range of a complete frame, without the trailing checksum.
///
/// Returns `None` if the frame is shorter than the envelope.
pub fn frame_data(frame: &[u8]) -> Option<&[u8]> {
    let end = frame.len().checked_sub(field::CHECKSUM)?;
    frame.get(FRAME_DATA_OFFSET..end)
}

fn sum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_range() {
        assert_eq!(compute(&[]), 0xFF);
        assert!(verify(&[], 0xFF));
    }

    #[test]
    fn test_sum_wraps_modulo_256() {
        // 0xFF + 0x02 = 0x101 -> low byte 0x01
        assert_eq!(compute(&[0xFF, 0x02]), 0xFE);
    }

    #[test]
    fn test_verify_detects_single_bit_flip() {
        let data = [0x10, 0x01, 0x39, 0x30];
        let cs = compute(&data);
        assert!(verify(&data, cs));
        assert!(!verify(&[0x10, 0x01, 0x39, 0x31], cs));
        assert!(!verify(&data, cs ^ 0x01));
    }

    #[test]
    fn test_frame_data_range() {
        let frame = [0x7E, 0x00, 0x02, 0xAA, 0xBB, 0x9A];
        assert_eq!(frame_data(&frame), Some(&[0xAA, 0xBB][..]));
        assert_eq!(frame_data(&[0x7E, 0x00, 0x00, 0xFF]), Some(&[][..]));
        assert_eq!(frame_data(&[0x7E, 0x00]), None);
    }
}
