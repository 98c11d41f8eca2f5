//! Per-packet errors raised while decoding datagrams.
//!
//! Every variant is transient: the offending datagram is dropped, counted
//! and ingestion continues.

use thiserror::Error;

use super::SequenceNumber;

/// Reasons a datagram cannot be turned into a [`Packet`](super::Packet).
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    /// The datagram is too short to hold a header.
    #[error("datagram of {len} bytes is shorter than the packet header")]
    Truncated { len: usize },
    /// The datagram carries a header but no samples.
    #[error("packet {sequence} carries no payload")]
    EmptyPayload { sequence: SequenceNumber },
    /// The payload length disagrees with the declared packet size.
    #[error("packet {sequence} payload is {actual} bytes; expected {expected}")]
    PayloadLengthMismatch {
        sequence: SequenceNumber,
        expected: usize,
        actual: usize,
    },
    /// Computing the byte offset or end offset overflowed `u64`.
    #[error("packet {sequence} byte offset overflows u64")]
    OffsetOverflow { sequence: SequenceNumber },
    /// The sequence number lies before the configured stream origin.
    #[error("packet {sequence} precedes sequence origin {origin}")]
    BeforeOrigin { sequence: SequenceNumber, origin: u32 },
}

impl PacketError {
    /// Short, stable label used for metrics and log fields.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Truncated { .. } => "truncated",
            Self::EmptyPayload { .. } => "empty",
            Self::PayloadLengthMismatch { .. } => "length_mismatch",
            Self::OffsetOverflow { .. } => "offset_overflow",
            Self::BeforeOrigin { .. } => "before_origin",
        }
    }
}
