//! Actuating side of the relay.

use std::time::Instant;

use crate::codec::{Angle, AngleCodec};
use crate::config::RelayConfig;
use crate::peripheral::Actuator;
use crate::protocol::{Frame, FrameReceiver, ReceiverStats};
use crate::transport::Transport;

/// Feeds link bytes through a [`FrameReceiver`] and drives the actuator.
///
/// Nothing here is fatal. Dropped frames and rejected commands are logged
/// and counted, and polling simply continues.
pub struct ReceiverNode {
    receiver: FrameReceiver,
    applied: u64,
    rejected: u64,
}

impl ReceiverNode {
    /// Create a receiver node with the config's capacity and idle timeout.
    ///
    /// The capacity is clamped to `MIN_CAPACITY..=MAX_CAPACITY`; call
    /// [`RelayConfig::validate`] first to reject it instead.
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            receiver: FrameReceiver::with_capacity(config.capacity)
                .with_idle_timeout(config.idle_timeout()),
            applied: 0,
            rejected: 0,
        }
    }

    /// Move the actuator to its resting position.
    pub fn home<A: Actuator>(&mut self, actuator: &mut A) {
        actuator.apply_position(Angle::MIN);
    }

    /// Drain every byte the transport has buffered.
    ///
    /// With nothing buffered, a partial frame older than the idle timeout is
    /// dropped. Buffered bytes count as arriving at `now`, however long ago
    /// the last poll was. Returns the number of positions applied.
    pub fn poll<T, A>(&mut self, transport: &mut T, actuator: &mut A, now: Instant) -> usize
    where
        T: Transport,
        A: Actuator,
    {
        if !transport.byte_available() {
            self.receiver.expire(now);
            return 0;
        }
        self.receiver.mark_activity(now);

        let mut applied = 0;
        while transport.byte_available() {
            let Some(byte) = transport.read_byte() else {
                break;
            };
            if self.feed(byte, now, actuator).is_some() {
                applied += 1;
            }
        }
        applied
    }

    /// Feed one byte that arrived at `now`.
    ///
    /// Returns the angle applied if this byte completed a valid command.
    pub fn feed<A: Actuator>(&mut self, byte: u8, now: Instant, actuator: &mut A) -> Option<Angle> {
        match self.receiver.push_byte_at(byte, now) {
            Ok(Some(frame)) => self.handle_frame(&frame, actuator),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!(error = %e, "Frame discarded");
                None
            }
        }
    }

    fn handle_frame<A: Actuator>(&mut self, frame: &Frame, actuator: &mut A) -> Option<Angle> {
        let payload = frame.payload();
        tracing::debug!(
            source = %frame.remote_address(),
            payload = %String::from_utf8_lossy(payload),
            "Received payload"
        );

        match AngleCodec::decode(payload) {
            Ok(angle) => {
                actuator.apply_position(angle);
                self.applied += 1;
                tracing::debug!(%angle, "Actuator set");
                Some(angle)
            }
            Err(e) => {
                self.rejected += 1;
                tracing::warn!(error = %e, "Invalid angle received");
                None
            }
        }
    }

    /// Drop any partial frame, e.g. after a read timeout.
    pub fn abandon_partial(&mut self) -> bool {
        self.receiver.abandon_partial()
    }

    /// Framing counters.
    #[inline]
    pub fn stats(&self) -> ReceiverStats {
        self.receiver.stats()
    }

    /// Positions handed to the actuator.
    #[inline]
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Valid frames whose command was out of range.
    #[inline]
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Underlying frame receiver, for its state and counters.
    pub fn receiver(&self) -> &FrameReceiver {
        &self.receiver
    }
}

impl Default for ReceiverNode {
    fn default() -> Self {
        Self::new(&RelayConfig::default())
    }
}
