//! Datagram-level primitives for the capture pipeline.
//!
//! A [`Packet`] is one datagram received from the capture board, reduced to
//! its sequence number, absolute byte offset within the sample stream and
//! payload bytes. [`PacketDecoder`] turns raw datagrams into packets,
//! either trusting the byte count carried in the header or deriving the
//! offset from the sequence counter.

pub mod decoder;
pub mod error;
pub mod header;
pub mod offset;
pub mod sequence;

use bytes::Bytes;
pub use decoder::{OffsetMode, PacketDecoder};
pub use error::PacketError;
pub use header::{HEADER_LEN, MAX_DATAGRAM_LEN, NOMINAL_PAYLOAD_LEN, PacketHeader};
pub use offset::{ByteOffset, SequenceNumber};
pub use sequence::SequenceUnwrapper;

/// One received datagram positioned within the sample stream.
///
/// The payload is never empty and `offset + len` always fits in a `u64`;
/// both are checked by [`Packet::new`].
///
/// # Examples
///
/// ```
/// use adcframe::packet::{ByteOffset, Packet, SequenceNumber};
///
/// let packet = Packet::new(SequenceNumber::new(3), ByteOffset::new(512), vec![0_u8; 256])
///     .expect("valid packet");
/// assert_eq!(packet.end(), ByteOffset::new(768));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    sequence: SequenceNumber,
    offset: ByteOffset,
    end: ByteOffset,
    payload: Bytes,
}

impl Packet {
    /// Create a packet, validating the payload and offset arithmetic.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::EmptyPayload`] when `payload` is empty and
    /// [`PacketError::OffsetOverflow`] when the end offset does not fit in a
    /// `u64`.
    pub fn new(
        sequence: SequenceNumber,
        offset: ByteOffset,
        payload: impl Into<Bytes>,
    ) -> Result<Self, PacketError> {
        let payload = payload.into();
        if payload.is_empty() {
            return Err(PacketError::EmptyPayload { sequence });
        }
        let end = u64::try_from(payload.len())
            .ok()
            .and_then(|len| offset.checked_add(len))
            .ok_or(PacketError::OffsetOverflow { sequence })?;
        Ok(Self {
            sequence,
            offset,
            end,
            payload,
        })
    }

    /// Wrapping sequence number as carried on the wire.
    #[must_use]
    pub const fn sequence(&self) -> SequenceNumber { self.sequence }

    /// Absolute byte offset of the first payload byte.
    #[must_use]
    pub const fn offset(&self) -> ByteOffset { self.offset }

    /// Offset one past the last payload byte.
    #[must_use]
    pub const fn end(&self) -> ByteOffset { self.end }

    /// Borrow the payload bytes.
    #[must_use]
    pub fn payload(&self) -> &Bytes { &self.payload }

    /// Number of payload bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.payload.len() }

    /// Always `false`; packets are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.payload.is_empty() }

    /// Report whether the packet carries the byte at `offset`.
    #[must_use]
    pub fn covers(&self, offset: ByteOffset) -> bool {
        self.offset <= offset && offset < self.end
    }

    /// Consume the packet, returning the payload.
    #[must_use]
    pub fn into_payload(self) -> Bytes { self.payload }
}
