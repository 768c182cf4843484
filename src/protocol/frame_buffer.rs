//! Streaming frame receiver.
//!
//! Uses `bytes::BytesMut` as a capacity-bounded accumulator and consumes the
//! serial stream one byte at a time:
//! - `Idle`: discard everything until a start delimiter
//! - `AccumulatingLength`: collect delimiter + 2 length bytes
//! - `AccumulatingPayload`: collect until `length + 4` bytes are buffered
//!
//! A completed frame is validated (checksum, layout) before it is emitted.
//! A frame that would not fit in the buffer is dropped as an overflow, and a
//! frame that stops arriving half way is dropped once the idle deadline passes.
//! Every outcome returns the receiver to `Idle`.
//!
//! # Example
//!
//! ```
//! use angle_relay::protocol::{encode_transmit_request, DestinationAddress, FrameReceiver};
//!
//! let bytes = encode_transmit_request(b"90", &DestinationAddress::BROADCAST, 1).unwrap();
//! let mut receiver = FrameReceiver::new();
//!
//! let mut frames = Vec::new();
//! for byte in bytes {
//!     if let Ok(Some(frame)) = receiver.push_byte(byte) {
//!         frames.push(frame);
//!     }
//! }
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].payload(), b"90");
//! ```

use std::time::{Duration, Instant};

use bytes::{BufMut, BytesMut};

use super::wire_format::{
    expected_total, DEFAULT_CAPACITY, LENGTH_PREFIX_SIZE, MAX_CAPACITY, MIN_CAPACITY,
    START_DELIMITER,
};
use super::Frame;
use crate::error::{RelayError, Result};

/// Default time a partial frame may go without a new byte before it is dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_millis(100);

/// Parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverState {
    /// Waiting for a start delimiter.
    Idle,
    /// Delimiter seen, reading the 2-byte length field.
    AccumulatingLength,
    /// Length known, reading until `expected_total` bytes are buffered.
    AccumulatingPayload { expected_total: usize },
}

/// Counters for everything the receiver has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    /// Valid frames emitted.
    pub frames: u64,
    /// Bytes discarded while idle.
    pub spurious_bytes: u64,
    /// Frames dropped because they outgrew the buffer.
    pub overflows: u64,
    /// Frames dropped on checksum mismatch.
    pub checksum_failures: u64,
    /// Frames dropped for an unknown type or a too-short layout.
    pub malformed: u64,
    /// Partial frames dropped by the idle deadline.
    pub stalls: u64,
}

/// Byte-at-a-time API frame parser.
pub struct FrameReceiver {
    /// Bytes of the frame in progress, starting with the delimiter.
    buffer: BytesMut,
    /// Current parsing state.
    state: ReceiverState,
    /// Largest frame accepted, in bytes.
    capacity: usize,
    /// Deadline for the next byte of a partial frame.
    idle_timeout: Duration,
    /// Arrival time of the last byte fed through `push_byte_at`.
    last_byte_at: Option<Instant>,
    stats: ReceiverStats,
}

impl FrameReceiver {
    /// Create a receiver with the default capacity (100 bytes) and idle
    /// timeout (100 ms).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a receiver with a custom capacity.
    ///
    /// The capacity is clamped to `MIN_CAPACITY..=MAX_CAPACITY`.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(MIN_CAPACITY, MAX_CAPACITY);
        Self {
            buffer: BytesMut::with_capacity(capacity),
            state: ReceiverState::Idle,
            capacity,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            last_byte_at: None,
            stats: ReceiverStats::default(),
        }
    }

    /// Set the idle deadline for partial frames.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Feed a single byte.
    ///
    /// Returns:
    /// - `Ok(Some(frame))` when this byte completes a valid frame
    /// - `Ok(None)` if more bytes are needed (or the byte was noise)
    /// - `Err(...)` when this byte completes a frame that had to be dropped
    ///   (`BufferOverflow`, `ChecksumMismatch`, `UnsupportedFrameType`,
    ///   `TruncatedFrame`)
    ///
    /// Errors are never sticky: the receiver is back in `Idle` either way.
    pub fn push_byte(&mut self, byte: u8) -> Result<Option<Frame>> {
        match self.state {
            ReceiverState::Idle => {
                if byte == START_DELIMITER {
                    self.buffer.clear();
                    self.buffer.put_u8(byte);
                    self.state = ReceiverState::AccumulatingLength;
                } else {
                    self.stats.spurious_bytes += 1;
                    tracing::trace!(byte, "Discarding byte outside frame");
                }
                Ok(None)
            }

            ReceiverState::AccumulatingLength => {
                self.buffer.put_u8(byte);
                if self.buffer.len() == LENGTH_PREFIX_SIZE {
                    let length = u16::from_be_bytes([self.buffer[1], self.buffer[2]]);
                    self.state = ReceiverState::AccumulatingPayload {
                        expected_total: expected_total(length),
                    };
                }
                Ok(None)
            }

            ReceiverState::AccumulatingPayload { expected_total } => {
                self.buffer.put_u8(byte);

                // Completion wins over overflow when both land on the same byte.
                if self.buffer.len() >= expected_total {
                    let raw = self.buffer.split().freeze();
                    self.state = ReceiverState::Idle;
                    return self.finish(Frame::parse(raw));
                }

                if self.buffer.len() >= self.capacity {
                    tracing::warn!(
                        expected_total,
                        capacity = self.capacity,
                        "Frame exceeds receive buffer, dropping"
                    );
                    self.buffer.clear();
                    self.state = ReceiverState::Idle;
                    self.stats.overflows += 1;
                    return Err(RelayError::BufferOverflow {
                        capacity: self.capacity,
                    });
                }

                Ok(None)
            }
        }
    }

    /// Feed a single byte that arrived at `now`, enforcing the idle deadline
    /// on any partial frame first.
    pub fn push_byte_at(&mut self, byte: u8, now: Instant) -> Result<Option<Frame>> {
        self.expire(now);
        let result = self.push_byte(byte);
        self.last_byte_at = Some(now);
        result
    }

    /// Push a block of bytes and collect all valid frames.
    ///
    /// Equivalent to calling `push_byte` for each byte in order. Dropped
    /// frames are logged and counted in [`stats`](Self::stats), never
    /// returned.
    pub fn push(&mut self, data: &[u8]) -> Vec<Frame> {
        let mut frames = Vec::new();

        for &byte in data {
            match self.push_byte(byte) {
                Ok(Some(frame)) => frames.push(frame),
                Ok(None) => {}
                Err(e) => tracing::debug!(error = %e, "Dropped frame"),
            }
        }

        frames
    }

    /// Drop the partial frame if no byte has arrived within the idle timeout.
    ///
    /// Returns true if a partial frame was dropped.
    pub fn expire(&mut self, now: Instant) -> bool {
        let stalled = self
            .last_byte_at
            .is_some_and(|last| now.saturating_duration_since(last) > self.idle_timeout);
        stalled && self.abandon_partial()
    }

    /// Record that bytes arrived at `now` without feeding any.
    ///
    /// Used when bytes were already buffered upstream, so the gap since the
    /// last byte says nothing about the link stalling.
    pub fn mark_activity(&mut self, now: Instant) {
        self.last_byte_at = Some(now);
    }

    /// Drop the partial frame in progress, if any, and return to `Idle`.
    ///
    /// Returns true if there was a partial frame.
    pub fn abandon_partial(&mut self) -> bool {
        if self.state == ReceiverState::Idle {
            return false;
        }
        tracing::debug!(
            buffered = self.buffer.len(),
            "Partial frame stalled, resetting receiver"
        );
        self.stats.stalls += 1;
        self.clear();
        true
    }

    fn finish(&mut self, parsed: Result<Frame>) -> Result<Option<Frame>> {
        match parsed {
            Ok(frame) => {
                self.stats.frames += 1;
                tracing::trace!(len = frame.len(), "Frame complete");
                Ok(Some(frame))
            }
            Err(e) => {
                match e {
                    RelayError::ChecksumMismatch { .. } => self.stats.checksum_failures += 1,
                    _ => self.stats.malformed += 1,
                }
                tracing::warn!(error = %e, "Dropping invalid frame");
                Err(e)
            }
        }
    }

    /// Current parser state.
    #[inline]
    pub fn state(&self) -> ReceiverState {
        self.state
    }

    /// Counters since creation.
    #[inline]
    pub fn stats(&self) -> ReceiverStats {
        self.stats
    }

    /// Largest frame accepted, in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Idle deadline for partial frames.
    #[inline]
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Number of bytes of the frame in progress.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if no partial frame is buffered.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Discard the partial frame and reset to `Idle`.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = ReceiverState::Idle;
    }
}

impl Default for FrameReceiver {
    fn default() -> Self {
        Self::new()
    }
}
