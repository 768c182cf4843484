//! Node module - the two ends of the relay.
//!
//! - [`SenderNode`] samples an input and writes a transmit request whenever
//!   the mapped angle changes
//! - [`ReceiverNode`] reads the link byte by byte and applies every valid
//!   angle command to an actuator
//!
//! Both are synchronous and poll-driven; the capabilities they touch are
//! passed in on every call. See [`crate::runtime`] for tokio loops around
//! them.

mod receiver;
mod sender;

pub use receiver::ReceiverNode;
pub use sender::SenderNode;
