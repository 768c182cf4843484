//! Shared fixtures for unit tests.

#![cfg(test)]

use crate::protocol::{
    checksum, DestinationAddress, FRAME_DATA_OFFSET, FRAME_TYPE_RECEIVE_PACKET, START_DELIMITER,
};

/// Destination used throughout the tests.
pub const DEST: DestinationAddress =
    DestinationAddress::new([0x00, 0x13, 0xA2, 0x00, 0x42, 0x2D, 0xB5, 0xC4]);

/// Build a receive packet the way a radio would deliver it.
pub fn receive_packet_bytes(source: &DestinationAddress, payload: &[u8]) -> Vec<u8> {
    let mut buf = vec![START_DELIMITER, 0x00, 0x00, FRAME_TYPE_RECEIVE_PACKET];
    buf.extend_from_slice(source.as_bytes());
    buf.extend_from_slice(&[0x12, 0x34]);
    buf.push(0x01); // acknowledged
    buf.extend_from_slice(payload);
    let length = (buf.len() - FRAME_DATA_OFFSET) as u16;
    buf[1..3].copy_from_slice(&length.to_be_bytes());
    let cs = checksum::compute(&buf[FRAME_DATA_OFFSET..]);
    buf.push(cs);
    buf
}
