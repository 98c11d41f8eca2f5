//! In-memory [`PacketSource`] driven by the test.

use std::io;

use adcframe::source::PacketSource;
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::stream::Chunk;

/// Packet source fed through a [`ScriptedFeed`].
///
/// The source stays open until every feed handle is dropped, then reports
/// end of stream.
#[derive(Debug)]
pub struct ScriptedSource {
    rx: mpsc::UnboundedReceiver<io::Result<Vec<u8>>>,
}

/// Sending half of a [`ScriptedSource`].
#[derive(Clone, Debug)]
pub struct ScriptedFeed {
    tx: mpsc::UnboundedSender<io::Result<Vec<u8>>>,
}

impl ScriptedSource {
    /// Create a connected source and feed.
    #[must_use]
    pub fn new() -> (Self, ScriptedFeed) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, ScriptedFeed { tx })
    }
}

impl ScriptedFeed {
    /// Queue a raw datagram. Returns `false` once the source is gone.
    pub fn datagram(&self, bytes: Vec<u8>) -> bool { self.tx.send(Ok(bytes)).is_ok() }

    /// Queue every chunk as an encoded datagram, in the given order.
    pub fn chunks<'a>(&self, chunks: impl IntoIterator<Item = &'a Chunk>) -> bool {
        chunks
            .into_iter()
            .all(|chunk| self.datagram(chunk.to_datagram()))
    }

    /// Make the source fail with `kind` on its next read.
    pub fn fail(&self, kind: io::ErrorKind) -> bool {
        self.tx.send(Err(io::Error::from(kind))).is_ok()
    }
}

#[async_trait]
impl PacketSource for ScriptedSource {
    async fn recv(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        match self.rx.recv().await {
            Some(Ok(datagram)) => {
                let len = datagram.len().min(buf.len());
                buf[..len].copy_from_slice(&datagram[..len]);
                Ok(Some(len))
            }
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }
}
