//! Codec module - payload encoding for relayed commands.
//!
//! - [`AngleCodec`] - decimal ASCII angle, validated to `1..=180`
//!
//! # Design
//!
//! Codecs are marker structs with static methods rather than trait objects,
//! so the payload format is fixed at compile time.

mod angle;

pub use angle::{Angle, AngleCodec, MAX_ANGLE, MAX_COMMAND_LEN, MIN_ANGLE};
