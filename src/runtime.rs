//! Async loops around the nodes.
//!
//! Each loop owns one node and one end of an async byte stream, such as a
//! serial port handle or a `tokio::io::duplex` pipe.
//!
//! # Example
//!
//! ```no_run
//! use angle_relay::config::RelayConfig;
//! use angle_relay::peripheral::{FixedSampler, RecordingActuator};
//! use angle_relay::runtime::{run_receiver, run_sender};
//! use std::time::Duration;
//!
//! # async fn demo() -> angle_relay::Result<()> {
//! let config = RelayConfig::default();
//! let (tx, rx) = tokio::io::duplex(256);
//! let mut servo = RecordingActuator::new();
//!
//! let shutdown = tokio::time::sleep(Duration::from_secs(1));
//! let (sent, stats) = tokio::join!(
//!     run_sender(FixedSampler::constant(0.5), tx, &config, shutdown),
//!     run_receiver(rx, &mut servo, &config),
//! );
//! sent?;
//! println!("{} frames", stats?.frames);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::time::Instant;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::MissedTickBehavior;

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::node::{ReceiverNode, SenderNode};
use crate::peripheral::{Actuator, Sampler};
use crate::protocol::ReceiverStats;

/// Bytes requested per read. Frames are small, so this only bounds latency.
const READ_CHUNK: usize = 256;

/// Sample on every interval tick and write a frame whenever the angle changes.
///
/// Runs until `shutdown` completes, then flushes and returns `Ok(())`. The
/// writer is dropped on return, which closes a pipe for the reader.
///
/// # Errors
///
/// Returns on an invalid config or the first I/O error from `writer`.
pub async fn run_sender<S, W, F>(
    mut sampler: S,
    mut writer: W,
    config: &RelayConfig,
    shutdown: F,
) -> Result<()>
where
    S: Sampler,
    W: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    config.validate()?;

    let mut node = SenderNode::new(config);
    let mut ticker = tokio::time::interval(config.sample_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    tracing::debug!(
        destination = %config.destination,
        interval_ms = config.sample_interval_ms,
        "Sender started"
    );

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        let (angle, frame) = match node.next_frame(&mut sampler) {
            Ok(Some(next)) => next,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot build frame");
                continue;
            }
        };

        writer.write_all(&frame).await?;
        writer.flush().await?;
        node.mark_sent(angle, &frame);
    }

    writer.flush().await?;
    tracing::debug!(last_sent = ?node.last_sent(), "Sender stopped");
    Ok(())
}

/// Read until EOF, applying every valid angle command to `actuator`.
///
/// The actuator is homed to the minimum angle first. A read that waits longer
/// than the idle timeout drops any partial frame.
///
/// # Errors
///
/// Returns on an invalid config or an I/O error from `reader`. Framing and
/// range errors are logged and counted, never returned.
pub async fn run_receiver<R, A>(
    mut reader: R,
    mut actuator: A,
    config: &RelayConfig,
) -> Result<ReceiverStats>
where
    R: AsyncRead + Unpin,
    A: Actuator,
{
    config.validate()?;

    let mut node = ReceiverNode::new(config);
    node.home(&mut actuator);

    let mut buf = vec![0u8; READ_CHUNK];

    loop {
        let n = match tokio::time::timeout(config.idle_timeout(), reader.read(&mut buf)).await {
            Err(_) => {
                node.abandon_partial();
                continue;
            }
            Ok(Ok(0)) => break, // Link closed
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(RelayError::Io(e)),
        };

        let now = Instant::now();
        for &byte in &buf[..n] {
            node.feed(byte, now, &mut actuator);
        }
    }

    let stats = node.stats();
    tracing::debug!(
        ?stats,
        applied = node.applied(),
        rejected = node.rejected(),
        "Receiver stopped"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::codec::Angle;
    use crate::peripheral::{FixedSampler, RecordingActuator};
    use crate::protocol::encode_transmit_request;
    use crate::test_utils::DEST;

    fn config() -> RelayConfig {
        RelayConfig::default()
            .with_destination(DEST)
            .with_sample_interval(Duration::from_millis(5))
            .with_idle_timeout(Duration::from_millis(20))
    }

    fn command(text: &str) -> Vec<u8> {
        encode_transmit_request(text.as_bytes(), &DEST, 0x01).unwrap()
    }

    #[tokio::test]
    async fn test_sender_writes_only_changes() {
        let (tx, mut rx) = tokio::io::duplex(256);
        let sampler = FixedSampler::scripted([0.0, 0.0, 1.0]);
        let config = config();

        let shutdown = tokio::time::sleep(Duration::from_millis(80));
        let mut written = Vec::new();
        let (sent, read) = tokio::join!(
            run_sender(sampler, tx, &config, shutdown),
            rx.read_to_end(&mut written),
        );
        sent.unwrap();
        read.unwrap();

        let mut expected = command("1");
        expected.extend(command("180"));
        assert_eq!(written, expected);
    }

    #[tokio::test]
    async fn test_sender_stops_on_broken_pipe() {
        let (tx, rx) = tokio::io::duplex(64);
        drop(rx);

        let result = run_sender(
            FixedSampler::constant(0.5),
            tx,
            &config(),
            std::future::pending(),
        )
        .await;
        assert!(matches!(result, Err(RelayError::Io(_))));
    }

    #[tokio::test]
    async fn test_sender_rejects_invalid_config() {
        let (tx, _rx) = tokio::io::duplex(64);
        let config = config().with_sample_interval(Duration::ZERO);

        let result = run_sender(FixedSampler::constant(0.5), tx, &config, async {}).await;
        assert!(matches!(result, Err(RelayError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_receiver_applies_until_eof() {
        let (mut tx, rx) = tokio::io::duplex(256);
        let mut servo = RecordingActuator::new();

        for text in ["90", "181", "45"] {
            tx.write_all(&command(text)).await.unwrap();
        }
        drop(tx);

        let stats = run_receiver(rx, &mut servo, &config()).await.unwrap();

        assert_eq!(
            servo.positions(),
            &[Angle::MIN, Angle::new(90).unwrap(), Angle::new(45).unwrap()]
        );
        assert_eq!(stats.frames, 3);
    }

    #[tokio::test]
    async fn test_receiver_abandons_stalled_frame() {
        let (mut tx, rx) = tokio::io::duplex(256);
        let mut servo = RecordingActuator::new();
        let first = command("120");

        let feeder = async move {
            tx.write_all(&first[..7]).await.unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
            tx.write_all(&first[7..]).await.unwrap();
            tx.write_all(&command("30")).await.unwrap();
        };

        let config = config();
        let (stats, ()) = tokio::join!(run_receiver(rx, &mut servo, &config), feeder);
        let stats = stats.unwrap();

        assert_eq!(servo.positions(), &[Angle::MIN, Angle::new(30).unwrap()]);
        assert_eq!(stats.stalls, 1);
        assert_eq!(stats.frames, 1);
    }
}
