//! Loopback - sender and receiver joined by an in-process pipe.
//!
//! This example demonstrates:
//! - Loading a `RelayConfig` from a JSON file (optional first argument)
//! - Running the async sender and receiver loops against each other
//! - Driving a simulated servo and printing its PWM timing
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=angle_relay=debug cargo run --example loopback
//! cargo run --example loopback -- relay.json
//! ```

use std::time::Duration;

use angle_relay::peripheral::{Actuator, Sampler, ServoDuty};
use angle_relay::runtime::{run_receiver, run_sender};
use angle_relay::{Angle, RelayConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Potentiometer being turned end to end, one step per read.
struct Sweep {
    value: f32,
    step: f32,
}

impl Sampler for Sweep {
    fn read_normalized(&mut self) -> f32 {
        let current = self.value;
        self.value += self.step;
        if !(0.0..=1.0).contains(&self.value) {
            self.step = -self.step;
            self.value = self.value.clamp(0.0, 1.0);
        }
        current
    }
}

/// Servo that prints the pulse it would drive.
struct PrintingServo {
    timing: ServoDuty,
}

impl Actuator for PrintingServo {
    fn apply_position(&mut self, angle: Angle) {
        let degrees = f32::from(angle.get());
        println!(
            "servo -> {:>3} deg  duty {:.4}  pulse {:?}",
            angle,
            self.timing.duty_for(degrees),
            self.timing.pulse_width(degrees)
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => RelayConfig::from_file(path)?,
        None => RelayConfig::default().with_sample_interval(Duration::from_millis(50)),
    };

    let (tx, rx) = tokio::io::duplex(1024);
    let sampler = Sweep {
        value: 0.0,
        step: 0.125,
    };
    let servo = PrintingServo {
        timing: ServoDuty::new(),
    };
    let shutdown = tokio::time::sleep(config.sample_interval() * 24);

    let (sent, stats) = tokio::join!(
        run_sender(sampler, tx, &config, shutdown),
        run_receiver(rx, servo, &config),
    );
    sent?;
    let stats = stats?;

    println!(
        "frames: {}, spurious bytes: {}, dropped: {}",
        stats.frames,
        stats.spurious_bytes,
        stats.overflows + stats.checksum_failures + stats.malformed + stats.stalls
    );
    Ok(())
}
