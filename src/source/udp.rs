//! UDP transport for capture datagrams.

use std::{io, net::SocketAddr};

use async_trait::async_trait;
use tokio::net::{ToSocketAddrs, UdpSocket};
use tracing::info;

use super::PacketSource;

/// Host address the capture card streams raw data to.
pub const DEFAULT_BIND_ADDR: &str = "192.168.33.30:4098";

/// [`PacketSource`] reading datagrams from a bound UDP socket.
#[derive(Debug)]
pub struct UdpPacketSource {
    socket: UdpSocket,
}

impl UdpPacketSource {
    /// Bind a socket on `addr` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be resolved or bound.
    pub async fn bind(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        info!(addr = ?socket.local_addr().ok(), "listening for capture datagrams");
        Ok(Self::from_socket(socket))
    }

    /// Wrap an already bound socket.
    #[must_use]
    pub fn from_socket(socket: UdpSocket) -> Self { Self { socket } }

    /// Address the socket is bound to.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot report its address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> { self.socket.local_addr() }
}

#[async_trait]
impl PacketSource for UdpPacketSource {
    async fn recv(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        self.socket.recv(buf).await.map(Some)
    }
}
