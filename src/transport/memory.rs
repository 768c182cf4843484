//! In-memory transport.
//!
//! Inbound bytes are queued with [`MemoryTransport::feed`], outbound bytes
//! collect in a buffer that can be drained with
//! [`MemoryTransport::take_written`]. Useful for tests and for wiring a sender
//! straight into a receiver.

use std::collections::VecDeque;

use super::Transport;
use crate::error::Result;

/// Byte transport backed by in-memory buffers.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    inbound: VecDeque<u8>,
    outbound: Vec<u8>,
}

impl MemoryTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for the reader side.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes);
    }

    /// Drain everything written so far.
    pub fn take_written(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.outbound)
    }

    /// Bytes written and not yet drained.
    pub fn written(&self) -> &[u8] {
        &self.outbound
    }

    /// Number of inbound bytes not yet read.
    pub fn pending(&self) -> usize {
        self.inbound.len()
    }
}

impl Transport for MemoryTransport {
    fn byte_available(&mut self) -> bool {
        !self.inbound.is_empty()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.inbound.pop_front()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.outbound.extend_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_in_order() {
        let mut transport = MemoryTransport::new();
        transport.feed(&[1, 2]);
        transport.feed(&[3]);

        let mut read = Vec::new();
        while transport.byte_available() {
            read.extend(transport.read_byte());
        }

        assert_eq!(read, vec![1, 2, 3]);
        assert_eq!(transport.read_byte(), None);
        assert_eq!(transport.pending(), 0);
    }

    #[test]
    fn test_take_written_drains() {
        let mut transport = MemoryTransport::new();
        transport.write(b"abc").unwrap();
        transport.write(b"de").unwrap();

        assert_eq!(transport.written(), b"abcde");
        assert_eq!(transport.take_written(), b"abcde".to_vec());
        assert!(transport.written().is_empty());
    }
}
