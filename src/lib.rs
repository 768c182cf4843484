//! # angle-relay
//!
//! Relays an angle from a sampled input to a servo over a serial radio link
//! speaking API frames.
//!
//! ## Architecture
//!
//! - **Sender**: sample, map to `1..=180`, and on change encode a transmit
//!   request (type `0x10`) carrying the angle as decimal ASCII
//! - **Receiver**: consume the link one byte at a time, validate each frame
//!   (length, checksum, layout), and hand the decoded angle to the actuator
//!
//! The link, the input and the actuator are injected capabilities
//! ([`transport::Transport`], [`peripheral::Sampler`],
//! [`peripheral::Actuator`]), so the whole relay runs in memory for tests.
//!
//! ## Example
//!
//! ```
//! use angle_relay::node::{ReceiverNode, SenderNode};
//! use angle_relay::peripheral::{FixedSampler, RecordingActuator};
//! use angle_relay::transport::MemoryTransport;
//! use angle_relay::RelayConfig;
//! use std::time::Instant;
//!
//! let config = RelayConfig::default();
//! let mut sender = SenderNode::new(&config);
//! let mut receiver = ReceiverNode::new(&config);
//!
//! let mut link = MemoryTransport::new();
//! let mut servo = RecordingActuator::new();
//!
//! sender.tick(&mut FixedSampler::constant(0.5), &mut link).unwrap();
//! let written = link.take_written();
//! link.feed(&written);
//! receiver.poll(&mut link, &mut servo, Instant::now());
//!
//! assert_eq!(servo.last().map(|a| a.get()), Some(90));
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod node;
pub mod peripheral;
pub mod protocol;
pub mod runtime;
pub mod transport;

mod test_utils;

pub use codec::{Angle, AngleCodec};
pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use protocol::{encode_transmit_request, DestinationAddress, Frame, FrameReceiver};
