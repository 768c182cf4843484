//! Wire format layout for API frames.
//!
//! Every frame shares the same envelope:
//! ```text
//! ┌───────────┬──────────┬─────────────────────────────┬──────────┐
//! │ Delimiter │ Length   │ Frame data                  │ Checksum │
//! │ 0x7E      │ uint16 BE│ type, fields, payload       │ 1 byte   │
//! └───────────┴──────────┴─────────────────────────────┴──────────┘
//! ```
//!
//! `Length` counts the frame data only, so a frame is always
//! `length + ENVELOPE_SIZE` bytes on the wire. The checksum covers the frame
//! data. All multi-byte integers are Big Endian.
//!
//! Transmit request (0x10), the only frame this crate builds:
//! ```text
//! ┌──────┬────┬──────────────┬──────────────┬────────┬─────────┬─────────┐
//! │ Type │ Id │ Dest 64-bit  │ Dest 16-bit  │ Radius │ Options │ Payload │
//! │ 1    │ 1  │ 8            │ 2 (0xFFFE)   │ 1      │ 1       │ N       │
//! └──────┴────┴──────────────┴──────────────┴────────┴─────────┴─────────┘
//! ```
//!
//! Receive packet (0x90), what a radio hands to the actuating node:
//! ```text
//! ┌──────┬──────────────┬──────────────┬─────────┬─────────┐
//! │ Type │ Src 64-bit   │ Src 16-bit   │ Options │ Payload │
//! │ 1    │ 8            │ 2            │ 1       │ N       │
//! └──────┴──────────────┴──────────────┴─────────┴─────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};

/// First byte of every frame.
pub const START_DELIMITER: u8 = 0x7E;

/// Frame type: transmit request.
pub const FRAME_TYPE_TRANSMIT_REQUEST: u8 = 0x10;

/// Frame type: receive packet.
pub const FRAME_TYPE_RECEIVE_PACKET: u8 = 0x90;

/// 16-bit network address meaning "unknown, resolve by 64-bit address".
pub const NETWORK_ADDRESS_UNKNOWN: u16 = 0xFFFE;

/// Broadcast radius 0 lets the radio use its maximum hop count.
pub const BROADCAST_RADIUS_UNRESTRICTED: u8 = 0x00;

/// No transmit options.
pub const TRANSMIT_OPTIONS_NONE: u8 = 0x00;

/// Default receive buffer capacity, which is also the largest frame allowed.
pub const DEFAULT_CAPACITY: usize = 100;

/// Field sizes in bytes.
pub mod field {
    pub const DELIMITER: usize = 1;
    pub const LENGTH: usize = 2;
    pub const FRAME_TYPE: usize = 1;
    pub const FRAME_ID: usize = 1;
    pub const ADDRESS_64: usize = 8;
    pub const ADDRESS_16: usize = 2;
    pub const RADIUS: usize = 1;
    pub const OPTIONS: usize = 1;
    pub const CHECKSUM: usize = 1;
}

/// Bytes needed before the length field can be read (delimiter + length).
pub const LENGTH_PREFIX_SIZE: usize = field::DELIMITER + field::LENGTH;

/// Bytes on the wire that the length field does not count.
pub const ENVELOPE_SIZE: usize = LENGTH_PREFIX_SIZE + field::CHECKSUM;

/// Offset of the frame type byte, where the checksummed range starts.
pub const FRAME_DATA_OFFSET: usize = LENGTH_PREFIX_SIZE;

/// Transmit request header size, i.e. the payload offset within the frame.
pub const TRANSMIT_REQUEST_HEADER_SIZE: usize = LENGTH_PREFIX_SIZE
    + field::FRAME_TYPE
    + field::FRAME_ID
    + field::ADDRESS_64
    + field::ADDRESS_16
    + field::RADIUS
    + field::OPTIONS;

/// Receive packet header size, i.e. the payload offset within the frame.
pub const RECEIVE_PACKET_HEADER_SIZE: usize = LENGTH_PREFIX_SIZE
    + field::FRAME_TYPE
    + field::ADDRESS_64
    + field::ADDRESS_16
    + field::OPTIONS;

/// Fixed bytes a transmit request adds around its payload.
pub const TRANSMIT_REQUEST_OVERHEAD: usize = TRANSMIT_REQUEST_HEADER_SIZE + field::CHECKSUM;

/// Smallest usable capacity: a transmit request with an empty payload.
pub const MIN_CAPACITY: usize = TRANSMIT_REQUEST_OVERHEAD;

/// Largest capacity the 16-bit length field can describe.
pub const MAX_CAPACITY: usize = u16::MAX as usize + ENVELOPE_SIZE;

/// Total frame size implied by a length field value.
#[inline]
pub fn expected_total(length_field: u16) -> usize {
    length_field as usize + ENVELOPE_SIZE
}

/// Largest transmit request payload that fits in `capacity` bytes.
#[inline]
pub fn max_payload_len(capacity: usize) -> usize {
    capacity.saturating_sub(TRANSMIT_REQUEST_OVERHEAD)
}

/// Frame types with a known header layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Outbound data addressed to a remote node (0x10).
    TransmitRequest,
    /// Inbound data delivered by the local radio (0x90).
    ReceivePacket,
}

impl FrameKind {
    /// Look up the layout for a frame type byte.
    pub fn from_type(frame_type: u8) -> Option<Self> {
        match frame_type {
            FRAME_TYPE_TRANSMIT_REQUEST => Some(Self::TransmitRequest),
            FRAME_TYPE_RECEIVE_PACKET => Some(Self::ReceivePacket),
            _ => None,
        }
    }

    /// Frame type byte on the wire.
    #[inline]
    pub fn frame_type(self) -> u8 {
        match self {
            Self::TransmitRequest => FRAME_TYPE_TRANSMIT_REQUEST,
            Self::ReceivePacket => FRAME_TYPE_RECEIVE_PACKET,
        }
    }

    /// Offset of the first payload byte from the start delimiter.
    #[inline]
    pub fn payload_offset(self) -> usize {
        match self {
            Self::TransmitRequest => TRANSMIT_REQUEST_HEADER_SIZE,
            Self::ReceivePacket => RECEIVE_PACKET_HEADER_SIZE,
        }
    }

    /// Offset of the 64-bit address: destination for a transmit request,
    /// source for a receive packet.
    #[inline]
    pub fn address_offset(self) -> usize {
        match self {
            Self::TransmitRequest => FRAME_DATA_OFFSET + field::FRAME_TYPE + field::FRAME_ID,
            Self::ReceivePacket => FRAME_DATA_OFFSET + field::FRAME_TYPE,
        }
    }

    /// Size of a frame of this kind with an empty payload.
    #[inline]
    pub fn min_frame_size(self) -> usize {
        self.payload_offset() + field::CHECKSUM
    }
}

/// 64-bit address of the node a transmit request is sent to.
///
/// Written in config as 16 hex digits, e.g. `"0013A200422DB5C4"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DestinationAddress([u8; field::ADDRESS_64]);

impl DestinationAddress {
    /// Reserved 64-bit broadcast address.
    pub const BROADCAST: Self = Self([0, 0, 0, 0, 0, 0, 0xFF, 0xFF]);

    pub const fn new(bytes: [u8; field::ADDRESS_64]) -> Self {
        Self(bytes)
    }

    /// Address bytes in wire order.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; field::ADDRESS_64] {
        &self.0
    }
}

impl FromStr for DestinationAddress {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        let mut bytes = [0u8; field::ADDRESS_64];
        hex::decode_to_slice(s.trim(), &mut bytes)
            .map_err(|e| RelayError::InvalidAddress(format!("{s:?}: {e}")))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for DestinationAddress {
    type Error = RelayError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<DestinationAddress> for String {
    fn from(addr: DestinationAddress) -> Self {
        addr.to_string()
    }
}

impl fmt::Display for DestinationAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}
