//! Datagram sources feeding a capture session.

mod udp;

use std::io;

use async_trait::async_trait;
pub use udp::{DEFAULT_BIND_ADDR, UdpPacketSource};

/// Abstraction over whatever delivers raw capture datagrams.
///
/// Implementations must be cancellation-safe: dropping a pending `recv()`
/// future must not lose a datagram that was already dequeued.
#[async_trait]
pub trait PacketSource: Send {
    /// Receive one datagram into `buf`.
    ///
    /// Returns `Ok(Some(len))` with the datagram length, or `Ok(None)` once the
    /// source has been closed and will yield nothing further.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the transport fails.
    async fn recv(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>>;
}

#[async_trait]
impl<S: PacketSource + ?Sized> PacketSource for Box<S> {
    async fn recv(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        (**self).recv(buf).await
    }
}
