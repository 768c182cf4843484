//! Sampling side of the relay.

use crate::codec::{Angle, AngleCodec, MAX_ANGLE, MIN_ANGLE};
use crate::config::RelayConfig;
use crate::error::Result;
use crate::peripheral::{map_normalized, Sampler};
use crate::protocol::{
    encode_transmit_request_with_capacity, DestinationAddress, MAX_CAPACITY, MIN_CAPACITY,
};
use crate::transport::Transport;

/// Turns sampler readings into transmit requests.
///
/// A frame is only produced when the mapped angle differs from the last one
/// sent, so a steady input costs nothing on the link.
#[derive(Debug, Clone)]
pub struct SenderNode {
    destination: DestinationAddress,
    frame_id: u8,
    capacity: usize,
    last_sent: Option<Angle>,
}

impl SenderNode {
    /// Create a sender node for the config's destination and frame id.
    ///
    /// The capacity is clamped to `MIN_CAPACITY..=MAX_CAPACITY`, the same
    /// bounds a [`ReceiverNode`](super::ReceiverNode) applies.
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            destination: config.destination,
            frame_id: config.frame_id,
            capacity: config.capacity.clamp(MIN_CAPACITY, MAX_CAPACITY),
            last_sent: None,
        }
    }

    /// Map a normalized reading to an angle in `1..=180`.
    pub fn angle_for(reading: f32) -> Result<Angle> {
        let degrees = map_normalized(reading, i32::from(MIN_ANGLE), i32::from(MAX_ANGLE));
        Angle::new(i64::from(degrees))
    }

    /// Sample once and build the frame for a new angle.
    ///
    /// Returns `None` when the angle has not changed since the last
    /// [`mark_sent`](Self::mark_sent). Nothing is recorded until the caller
    /// confirms the write.
    pub fn next_frame<S: Sampler>(&self, sampler: &mut S) -> Result<Option<(Angle, Vec<u8>)>> {
        let angle = Self::angle_for(sampler.read_normalized())?;
        if self.last_sent == Some(angle) {
            return Ok(None);
        }

        let payload = AngleCodec::encode(angle);
        let frame = encode_transmit_request_with_capacity(
            &payload,
            &self.destination,
            self.frame_id,
            self.capacity,
        )?;
        Ok(Some((angle, frame)))
    }

    /// Record that `angle` went out on the link.
    pub fn mark_sent(&mut self, angle: Angle, frame: &[u8]) {
        tracing::debug!(
            %angle,
            frame = %hex::encode_upper(frame),
            "Sent angle"
        );
        self.last_sent = Some(angle);
    }

    /// Sample, and write a frame if the angle changed.
    ///
    /// Returns the angle that was sent, if any.
    ///
    /// # Errors
    ///
    /// Propagates transport write errors. The angle is not recorded as sent,
    /// so the next tick retries it.
    pub fn tick<S, T>(&mut self, sampler: &mut S, transport: &mut T) -> Result<Option<Angle>>
    where
        S: Sampler,
        T: Transport,
    {
        let Some((angle, frame)) = self.next_frame(sampler)? else {
            return Ok(None);
        };
        transport.write(&frame)?;
        self.mark_sent(angle, &frame);
        Ok(Some(angle))
    }

    /// Largest frame this node builds, in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Last angle written, if any.
    #[inline]
    pub fn last_sent(&self) -> Option<Angle> {
        self.last_sent
    }
}
