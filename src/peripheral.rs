//! Capabilities for the hardware at either end of the link.
//!
//! The sender reads a normalized input through a [`Sampler`], the receiver
//! drives a hobby servo through an [`Actuator`]. Both are injected into the
//! nodes, so everything above this module runs against the in-memory
//! [`FixedSampler`] and [`RecordingActuator`] in tests.

use std::collections::VecDeque;
use std::time::Duration;

use crate::codec::{Angle, MAX_ANGLE};

/// Source of a normalized reading, e.g. a potentiometer on an ADC.
pub trait Sampler {
    /// Read the current value. Callers clamp the result to `[0.0, 1.0]`.
    fn read_normalized(&mut self) -> f32;
}

/// Sink for validated angle commands.
pub trait Actuator {
    fn apply_position(&mut self, angle: Angle);
}

impl<S: Sampler + ?Sized> Sampler for &mut S {
    fn read_normalized(&mut self) -> f32 {
        (**self).read_normalized()
    }
}

impl<A: Actuator + ?Sized> Actuator for &mut A {
    fn apply_position(&mut self, angle: Angle) {
        (**self).apply_position(angle)
    }
}

/// Map a normalized value onto `out_min..=out_max`.
///
/// The input is clamped to `[0.0, 1.0]` (NaN reads as 0) and the result is
/// truncated toward zero.
pub fn map_normalized(value: f32, out_min: i32, out_max: i32) -> i32 {
    let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    (value * (out_max - out_min) as f32 + out_min as f32) as i32
}

/// PWM timing for an SG90-class servo.
///
/// 50 Hz, with 0.5 ms high at 0 degrees and 2.5 ms high at 180 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServoDuty {
    period: Duration,
    min_duty: f32,
    max_duty: f32,
}

impl ServoDuty {
    pub const PERIOD: Duration = Duration::from_millis(20);
    pub const MIN_DUTY: f32 = 0.025;
    pub const MAX_DUTY: f32 = 0.125;

    pub fn new() -> Self {
        Self {
            period: Self::PERIOD,
            min_duty: Self::MIN_DUTY,
            max_duty: Self::MAX_DUTY,
        }
    }

    /// PWM period.
    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Duty cycle in `[0.0, 1.0]` for an angle in degrees, clamped to `0..=180`.
    pub fn duty_for(&self, degrees: f32) -> f32 {
        let degrees = degrees.clamp(0.0, f32::from(MAX_ANGLE));
        self.min_duty + (degrees / f32::from(MAX_ANGLE)) * (self.max_duty - self.min_duty)
    }

    /// High time within one period for an angle.
    pub fn pulse_width(&self, degrees: f32) -> Duration {
        self.period.mul_f32(self.duty_for(degrees))
    }
}

impl Default for ServoDuty {
    fn default() -> Self {
        Self::new()
    }
}

/// Sampler that replays a script of readings, repeating the last one.
#[derive(Debug, Clone, Default)]
pub struct FixedSampler {
    readings: VecDeque<f32>,
    last: f32,
}

impl FixedSampler {
    /// Always read `value`.
    pub fn constant(value: f32) -> Self {
        Self {
            readings: VecDeque::new(),
            last: value,
        }
    }

    /// Read each value in turn, then keep returning the final one.
    pub fn scripted(readings: impl IntoIterator<Item = f32>) -> Self {
        Self {
            readings: readings.into_iter().collect(),
            last: 0.0,
        }
    }

    pub fn set(&mut self, value: f32) {
        self.readings.clear();
        self.last = value;
    }
}

impl Sampler for FixedSampler {
    fn read_normalized(&mut self) -> f32 {
        if let Some(next) = self.readings.pop_front() {
            self.last = next;
        }
        self.last
    }
}

/// Actuator that records every position it is given.
#[derive(Debug, Clone, Default)]
pub struct RecordingActuator {
    positions: Vec<Angle>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every applied position, oldest first.
    pub fn positions(&self) -> &[Angle] {
        &self.positions
    }

    /// Most recent position.
    pub fn last(&self) -> Option<Angle> {
        self.positions.last().copied()
    }
}

impl Actuator for RecordingActuator {
    fn apply_position(&mut self, angle: Angle) {
        self.positions.push(angle);
    }
}
