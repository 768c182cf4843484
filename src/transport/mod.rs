//! Transport module - the byte link between the two nodes.
//!
//! The polling nodes only need three operations from the serial link, so the
//! link is injected as a [`Transport`] rather than owned by the core. The
//! async runtime works on any `tokio::io::AsyncRead`/`AsyncWrite` instead.

mod memory;

pub use memory::MemoryTransport;

use crate::error::Result;

/// Non-blocking, byte-oriented duplex link.
pub trait Transport {
    /// Check whether a byte can be read without blocking.
    fn byte_available(&mut self) -> bool;

    /// Read one byte, or `None` if nothing is buffered.
    fn read_byte(&mut self) -> Option<u8>;

    /// Write bytes to the link. Delivery is not acknowledged.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn byte_available(&mut self) -> bool {
        (**self).byte_available()
    }

    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }
}
