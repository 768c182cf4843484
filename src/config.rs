//! Node configuration.
//!
//! Both nodes share one [`RelayConfig`]. It can be built in code with the
//! `with_*` setters or loaded from JSON, where every field is optional:
//!
//! ```json
//! {
//!   "destination": "0013A200422DB5C4",
//!   "frame_id": 1,
//!   "capacity": 100,
//!   "idle_timeout_ms": 100,
//!   "sample_interval_ms": 200
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{RelayError, Result};
use crate::protocol::{
    DestinationAddress, DEFAULT_CAPACITY, DEFAULT_IDLE_TIMEOUT, MAX_CAPACITY, MIN_CAPACITY,
};

/// Default frame id. Non-zero asks the radio for a transmit status.
pub const DEFAULT_FRAME_ID: u8 = 0x01;

/// Default time between two samples on the sender.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(200);

/// Configuration for the sender and receiver nodes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayConfig {
    /// 64-bit address transmit requests are sent to.
    pub destination: DestinationAddress,
    /// Frame id placed in every transmit request.
    pub frame_id: u8,
    /// Largest frame, in bytes, either side will build or accept.
    pub capacity: usize,
    /// Partial frames are dropped after this long without a byte.
    pub idle_timeout_ms: u64,
    /// Sender tick interval.
    pub sample_interval_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            destination: DestinationAddress::BROADCAST,
            frame_id: DEFAULT_FRAME_ID,
            capacity: DEFAULT_CAPACITY,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT.as_millis() as u64,
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL.as_millis() as u64,
        }
    }
}

impl RelayConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), ?config, "Loaded relay config");
        Ok(config)
    }

    /// Set the destination address.
    pub fn with_destination(mut self, destination: DestinationAddress) -> Self {
        self.destination = destination;
        self
    }

    /// Set the frame id.
    pub fn with_frame_id(mut self, frame_id: u8) -> Self {
        self.frame_id = frame_id;
        self
    }

    /// Set the frame capacity in bytes.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the idle deadline for partial frames.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the sender tick interval.
    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval_ms = interval.as_millis() as u64;
        self
    }

    #[inline]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    #[inline]
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the capacity is outside
    /// `MIN_CAPACITY..=MAX_CAPACITY` or either duration is zero.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&self.capacity) {
            return Err(RelayError::InvalidConfig(format!(
                "capacity {} outside {MIN_CAPACITY}..={MAX_CAPACITY}",
                self.capacity
            )));
        }
        if self.idle_timeout_ms == 0 {
            return Err(RelayError::InvalidConfig(
                "idle_timeout_ms must be non-zero".into(),
            ));
        }
        if self.sample_interval_ms == 0 {
            return Err(RelayError::InvalidConfig(
                "sample_interval_ms must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
