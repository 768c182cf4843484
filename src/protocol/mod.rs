//! Protocol module - wire format, checksum, framing, and frame types.
//!
//! This module implements the API frame protocol used on the serial link:
//! - Header layout constants and frame kinds
//! - Single-byte checksum
//! - Transmit request encoder and validated `Frame` type
//! - Byte-at-a-time receiver for noisy streams

pub mod checksum;
mod frame;
mod frame_buffer;
mod wire_format;

pub use frame::{encode_transmit_request, encode_transmit_request_with_capacity, Frame};
pub use frame_buffer::{FrameReceiver, ReceiverState, ReceiverStats, DEFAULT_IDLE_TIMEOUT};
pub use wire_format::{
    expected_total, field, max_payload_len, DestinationAddress, FrameKind,
    BROADCAST_RADIUS_UNRESTRICTED, DEFAULT_CAPACITY, ENVELOPE_SIZE, FRAME_DATA_OFFSET,
    FRAME_TYPE_RECEIVE_PACKET, FRAME_TYPE_TRANSMIT_REQUEST, LENGTH_PREFIX_SIZE, MAX_CAPACITY,
    MIN_CAPACITY, NETWORK_ADDRESS_UNKNOWN, RECEIVE_PACKET_HEADER_SIZE, START_DELIMITER,
    TRANSMIT_OPTIONS_NONE, TRANSMIT_REQUEST_HEADER_SIZE, TRANSMIT_REQUEST_OVERHEAD,
};
