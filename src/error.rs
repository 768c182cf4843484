//! Error types for angle-relay.

use thiserror::Error;

/// Main error type for all relay operations.
///
/// None of these are fatal to a running node: the polling loops log them and
/// drop the offending input.
#[derive(Debug, Error)]
pub enum RelayError {
    /// I/O error on the underlying byte transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error while loading configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload does not fit in a single frame of the configured capacity.
    #[error("Payload of {len} bytes exceeds maximum {max}")]
    OversizePayload { len: usize, max: usize },

    /// Receive buffer filled up before the frame's declared length was reached.
    #[error("Receive buffer overflow at {capacity} bytes")]
    BufferOverflow { capacity: usize },

    /// Trailing checksum byte does not match the recomputed value.
    #[error("Checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// Decoded command is not a valid angle.
    #[error("Angle {0} out of range 1..=180")]
    PayloadOutOfRange(i64),

    /// First byte of a frame is not the start delimiter.
    #[error("Missing start delimiter, got {0:#04x}")]
    MissingStartDelimiter(u8),

    /// Frame type has no known header layout.
    #[error("Unsupported frame type {0:#04x}")]
    UnsupportedFrameType(u8),

    /// Frame is shorter than its header layout requires.
    #[error("Truncated frame: {len} bytes, need at least {min}")]
    TruncatedFrame { len: usize, min: usize },

    /// Destination address text is not 16 hex digits.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Configuration value outside its allowed range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type alias using RelayError.
pub type Result<T> = std::result::Result<T, RelayError>;
