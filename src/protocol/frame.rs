//! Frame struct with typed accessors, and the transmit request encoder.
//!
//! A [`Frame`] is only constructed from bytes that passed validation: start
//! delimiter, length field, checksum and a known header layout. Accessors can
//! therefore index into the raw bytes without further checks.
//!
//! # Example
//!
//! ```
//! use angle_relay::protocol::{encode_transmit_request, DestinationAddress, Frame};
//! use bytes::Bytes;
//!
//! let dest = DestinationAddress::new([0x00, 0x13, 0xA2, 0x00, 0x42, 0x2D, 0xB5, 0xC4]);
//! let bytes = encode_transmit_request(b"90", &dest, 0x01).unwrap();
//! assert_eq!(bytes.len(), 20);
//!
//! let frame = Frame::parse(Bytes::from(bytes)).unwrap();
//! assert_eq!(frame.payload(), b"90");
//! assert_eq!(frame.frame_id(), Some(0x01));
//! ```

use bytes::Bytes;

use super::checksum;
use super::wire_format::{
    expected_total, field, max_payload_len, DestinationAddress, FrameKind,
    BROADCAST_RADIUS_UNRESTRICTED, DEFAULT_CAPACITY, ENVELOPE_SIZE, FRAME_DATA_OFFSET,
    FRAME_TYPE_TRANSMIT_REQUEST, MAX_CAPACITY, NETWORK_ADDRESS_UNKNOWN, START_DELIMITER,
    TRANSMIT_OPTIONS_NONE, TRANSMIT_REQUEST_OVERHEAD,
};
use crate::error::{RelayError, Result};

/// A complete, checksum-verified API frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Full frame bytes, delimiter through checksum.
    raw: Bytes,
    /// Header layout selected by the frame type byte.
    kind: FrameKind,
}

impl Frame {
    /// Validate raw frame bytes.
    ///
    /// Bytes past the length declared in the header are ignored.
    ///
    /// # Errors
    ///
    /// - `MissingStartDelimiter` if the first byte is not `0x7E`
    /// - `TruncatedFrame` if fewer bytes than the header declares are present,
    ///   or the frame is too short for its layout
    /// - `ChecksumMismatch` if the trailing byte does not match
    /// - `UnsupportedFrameType` if the type byte has no known layout
    pub fn parse(raw: Bytes) -> Result<Self> {
        if raw.len() < ENVELOPE_SIZE {
            return Err(RelayError::TruncatedFrame {
                len: raw.len(),
                min: ENVELOPE_SIZE,
            });
        }
        if raw[0] != START_DELIMITER {
            return Err(RelayError::MissingStartDelimiter(raw[0]));
        }

        let total = expected_total(u16::from_be_bytes([raw[1], raw[2]]));
        if raw.len() < total {
            return Err(RelayError::TruncatedFrame {
                len: raw.len(),
                min: total,
            });
        }
        let raw = raw.slice(..total);

        let actual = raw[total - field::CHECKSUM];
        let data = checksum::frame_data(&raw).ok_or(RelayError::TruncatedFrame {
            len: total,
            min: ENVELOPE_SIZE,
        })?;
        if !checksum::verify(data, actual) {
            return Err(RelayError::ChecksumMismatch {
                expected: checksum::compute(data),
                actual,
            });
        }

        let frame_type = *data.first().ok_or(RelayError::TruncatedFrame {
            len: total,
            min: ENVELOPE_SIZE + field::FRAME_TYPE,
        })?;
        let kind = FrameKind::from_type(frame_type)
            .ok_or(RelayError::UnsupportedFrameType(frame_type))?;
        if total < kind.min_frame_size() {
            return Err(RelayError::TruncatedFrame {
                len: total,
                min: kind.min_frame_size(),
            });
        }

        Ok(Self { raw, kind })
    }

    /// Header layout of this frame.
    #[inline]
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    /// Frame type byte.
    #[inline]
    pub fn frame_type(&self) -> u8 {
        self.kind.frame_type()
    }

    /// Value of the length field (frame data size).
    #[inline]
    pub fn length_field(&self) -> u16 {
        u16::from_be_bytes([self.raw[1], self.raw[2]])
    }

    /// Correlation id. Only transmit requests carry one.
    pub fn frame_id(&self) -> Option<u8> {
        match self.kind {
            FrameKind::TransmitRequest => Some(self.raw[FRAME_DATA_OFFSET + field::FRAME_TYPE]),
            FrameKind::ReceivePacket => None,
        }
    }

    /// 64-bit address: the destination of a transmit request, the source of
    /// a receive packet.
    pub fn remote_address(&self) -> DestinationAddress {
        let start = self.kind.address_offset();
        let mut bytes = [0u8; field::ADDRESS_64];
        bytes.copy_from_slice(&self.raw[start..start + field::ADDRESS_64]);
        DestinationAddress::new(bytes)
    }

    /// 16-bit network address following the 64-bit address.
    pub fn network_address(&self) -> u16 {
        let start = self.kind.address_offset() + field::ADDRESS_64;
        u16::from_be_bytes([self.raw[start], self.raw[start + 1]])
    }

    /// Payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.raw[self.kind.payload_offset()..self.raw.len() - field::CHECKSUM]
    }

    /// Payload as `Bytes` (zero-copy slice of the frame).
    pub fn payload_bytes(&self) -> Bytes {
        self.raw
            .slice(self.kind.payload_offset()..self.raw.len() - field::CHECKSUM)
    }

    /// Trailing checksum byte.
    #[inline]
    pub fn checksum(&self) -> u8 {
        self.raw[self.raw.len() - field::CHECKSUM]
    }

    /// Full frame bytes as received.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Total frame size on the wire.
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Always false: a frame holds at least its envelope.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Consume the frame, returning its raw bytes.
    pub fn into_bytes(self) -> Bytes {
        self.raw
    }
}

/// Build a transmit request that fits in [`DEFAULT_CAPACITY`] bytes.
///
/// See [`encode_transmit_request_with_capacity`].
pub fn encode_transmit_request(
    payload: &[u8],
    destination: &DestinationAddress,
    frame_id: u8,
) -> Result<Vec<u8>> {
    encode_transmit_request_with_capacity(payload, destination, frame_id, DEFAULT_CAPACITY)
}

/// Build a complete transmit request frame.
///
/// The output is always `payload.len() + TRANSMIT_REQUEST_OVERHEAD` bytes
/// with a length field of `payload.len() + 14`. Frame id `0x00` asks the
/// radio for no transmit status; it is not treated specially here.
///
/// # Errors
///
/// Returns `OversizePayload` if the frame would exceed `capacity` bytes.
pub fn encode_transmit_request_with_capacity(
    payload: &[u8],
    destination: &DestinationAddress,
    frame_id: u8,
    capacity: usize,
) -> Result<Vec<u8>> {
    let max = max_payload_len(capacity.min(MAX_CAPACITY));
    if payload.len() > max {
        return Err(RelayError::OversizePayload {
            len: payload.len(),
            max,
        });
    }

    let total = TRANSMIT_REQUEST_OVERHEAD + payload.len();
    // Bounded by MAX_CAPACITY above.
    let length = (total - ENVELOPE_SIZE) as u16;

    let mut buf = Vec::with_capacity(total);
    buf.push(START_DELIMITER);
    buf.extend_from_slice(&length.to_be_bytes());
    buf.push(FRAME_TYPE_TRANSMIT_REQUEST);
    buf.push(frame_id);
    buf.extend_from_slice(destination.as_bytes());
    buf.extend_from_slice(&NETWORK_ADDRESS_UNKNOWN.to_be_bytes());
    buf.push(BROADCAST_RADIUS_UNRESTRICTED);
    buf.push(TRANSMIT_OPTIONS_NONE);
    buf.extend_from_slice(payload);
    let cs = checksum::compute(&buf[FRAME_DATA_OFFSET..]);
    buf.push(cs);

    debug_assert_eq!(buf.len(), total);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::wire_format::TRANSMIT_REQUEST_HEADER_SIZE;
    use crate::test_utils::{receive_packet_bytes, DEST};

    #[test]
    fn test_encode_known_frame() {
        let bytes = encode_transmit_request(b"90", &DEST, 0x01).unwrap();
        assert_eq!(
            bytes,
            vec![
                0x7E, 0x00, 0x10, 0x10, 0x01, 0x00, 0x13, 0xA2, 0x00, 0x42, 0x2D, 0xB5, 0xC4,
                0xFF, 0xFE, 0x00, 0x00, 0x39, 0x30, 0xEB,
            ]
        );
    }

    #[test]
    fn test_encode_length_and_size() {
        for len in [0usize, 1, 3, 40, 82] {
            let payload = vec![b'7'; len];
            let bytes = encode_transmit_request(&payload, &DEST, 0x05).unwrap();
            assert_eq!(bytes.len(), TRANSMIT_REQUEST_OVERHEAD + len);
            let length = u16::from_be_bytes([bytes[1], bytes[2]]) as usize;
            assert_eq!(length, 14 + len);
            assert_eq!(length + ENVELOPE_SIZE, bytes.len());
        }
    }

    #[test]
    fn test_encode_is_deterministic() {
        let a = encode_transmit_request(b"123", &DEST, 0x07).unwrap();
        let b = encode_transmit_request(b"123", &DEST, 0x07).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_encode_rejects_oversize_payload() {
        let payload = vec![b'1'; 83];
        let err = encode_transmit_request(&payload, &DEST, 0x01).unwrap_err();
        assert!(matches!(
            err,
            RelayError::OversizePayload { len: 83, max: 82 }
        ));
    }

    #[test]
    fn test_encode_custom_capacity() {
        let payload = vec![b'1'; 100];
        assert!(encode_transmit_request_with_capacity(&payload, &DEST, 1, 118).is_ok());
        assert!(encode_transmit_request_with_capacity(&payload, &DEST, 1, 117).is_err());
    }

    #[test]
    fn test_parse_transmit_request_accessors() {
        let bytes = encode_transmit_request(b"180", &DEST, 0x42).unwrap();
        let frame = Frame::parse(Bytes::from(bytes)).unwrap();

        assert_eq!(frame.kind(), FrameKind::TransmitRequest);
        assert_eq!(frame.frame_type(), FRAME_TYPE_TRANSMIT_REQUEST);
        assert_eq!(frame.frame_id(), Some(0x42));
        assert_eq!(frame.remote_address(), DEST);
        assert_eq!(frame.network_address(), NETWORK_ADDRESS_UNKNOWN);
        assert_eq!(frame.length_field(), 17);
        assert_eq!(frame.payload(), b"180");
        assert_eq!(frame.len(), 21);
        assert!(!frame.is_empty());
    }

    #[test]
    fn test_payload_starts_after_header() {
        let bytes = encode_transmit_request(b"42", &DEST, 0x01).unwrap();
        assert_eq!(&bytes[TRANSMIT_REQUEST_HEADER_SIZE..bytes.len() - 1], b"42");
    }

    #[test]
    fn test_parse_receive_packet() {
        let bytes = receive_packet_bytes(&DEST, b"90");
        let frame = Frame::parse(Bytes::from(bytes)).unwrap();

        assert_eq!(frame.kind(), FrameKind::ReceivePacket);
        assert_eq!(frame.frame_id(), None);
        assert_eq!(frame.remote_address(), DEST);
        assert_eq!(frame.network_address(), 0x1234);
        assert_eq!(frame.payload(), b"90");
    }

    #[test]
    fn test_parse_checksum_mismatch() {
        let mut bytes = encode_transmit_request(b"90", &DEST, 0x01).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;

        let err = Frame::parse(Bytes::from(bytes)).unwrap_err();
        assert!(matches!(
            err,
            RelayError::ChecksumMismatch {
                expected: 0xEB,
                actual: 0x14
            }
        ));
    }

    #[test]
    fn test_parse_missing_delimiter() {
        let mut bytes = encode_transmit_request(b"90", &DEST, 0x01).unwrap();
        bytes[0] = 0x00;
        assert!(matches!(
            Frame::parse(Bytes::from(bytes)),
            Err(RelayError::MissingStartDelimiter(0x00))
        ));
    }

    #[test]
    fn test_parse_short_input() {
        let bytes = encode_transmit_request(b"90", &DEST, 0x01).unwrap();
        let err = Frame::parse(Bytes::copy_from_slice(&bytes[..10])).unwrap_err();
        assert!(matches!(err, RelayError::TruncatedFrame { len: 10, min: 20 }));
    }

    #[test]
    fn test_parse_ignores_trailing_bytes() {
        let mut bytes = encode_transmit_request(b"90", &DEST, 0x01).unwrap();
        bytes.extend_from_slice(&[0x7E, 0x00]);
        let frame = Frame::parse(Bytes::from(bytes)).unwrap();
        assert_eq!(frame.len(), 20);
    }

    #[test]
    fn test_parse_unsupported_type() {
        // Transmit status (0x8B): id, 16-bit addr, retries, delivery, discovery
        let mut bytes = vec![0x7E, 0x00, 0x07, 0x8B, 0x01, 0xFF, 0xFE, 0x00, 0x00, 0x00];
        let cs = checksum::compute(&bytes[FRAME_DATA_OFFSET..]);
        bytes.push(cs);
        assert!(matches!(
            Frame::parse(Bytes::from(bytes)),
            Err(RelayError::UnsupportedFrameType(0x8B))
        ));
    }

    #[test]
    fn test_parse_layout_too_short() {
        // Valid checksum, transmit request type, but no room for the header.
        let mut bytes = vec![0x7E, 0x00, 0x02, 0x10, 0x01];
        let cs = checksum::compute(&bytes[FRAME_DATA_OFFSET..]);
        bytes.push(cs);
        assert!(matches!(
            Frame::parse(Bytes::from(bytes)),
            Err(RelayError::TruncatedFrame { len: 6, min: 18 })
        ));
    }

    #[test]
    fn test_parse_empty_frame_data() {
        let bytes = vec![0x7E, 0x00, 0x00, 0xFF];
        assert!(matches!(
            Frame::parse(Bytes::from(bytes)),
            Err(RelayError::TruncatedFrame { len: 4, min: 5 })
        ));
    }

    #[test]
    fn test_payload_bytes_zero_copy() {
        let bytes = Bytes::from(encode_transmit_request(b"77", &DEST, 0x01).unwrap());
        let frame = Frame::parse(bytes.clone()).unwrap();
        let payload = frame.payload_bytes();
        assert_eq!(&payload[..], b"77");
        assert_eq!(payload.as_ptr(), bytes[17..].as_ptr());
    }
}
