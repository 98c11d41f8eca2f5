//! Lifecycle of the frame assembler.

use crate::packet::ByteOffset;

/// Where the assembler is in its reassembly lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssemblerState {
    /// No byte at the session origin has been consumed yet.
    AwaitingFirstPacket,
    /// A frame is being filled.
    Accumulating,
    /// A frame was abandoned; waiting for the packet carrying `boundary`.
    Resyncing { boundary: ByteOffset },
    /// Stopped. No further packets are accepted.
    Closed,
}

impl AssemblerState {
    /// Report whether the assembler has been stopped.
    #[must_use]
    pub const fn is_closed(&self) -> bool { matches!(self, Self::Closed) }
}
