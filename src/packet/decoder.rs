//! Conversion of raw datagrams into positioned [`Packet`]s.

use std::num::NonZeroUsize;

use super::{ByteOffset, Packet, PacketError, PacketHeader, SequenceUnwrapper};

/// How a packet's byte offset is determined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OffsetMode {
    /// Use the byte count carried in the header.
    #[default]
    Explicit,
    /// Ignore the header byte count and derive the offset from the sequence
    /// number: `(sequence - sequence_origin) * nominal_payload`.
    ///
    /// Every payload must be exactly `nominal_payload` bytes.
    Derived {
        nominal_payload: NonZeroUsize,
        sequence_origin: u32,
    },
}

/// Stateful datagram decoder.
///
/// The decoder keeps a [`SequenceUnwrapper`] so derived offsets remain
/// monotonic across 32-bit counter wraps.
///
/// # Examples
///
/// ```
/// use adcframe::packet::{OffsetMode, PacketDecoder, PacketHeader, SequenceNumber};
///
/// let mut datagram = Vec::new();
/// PacketHeader::new(SequenceNumber::new(1), 0).encode_into(&mut datagram);
/// datagram.extend_from_slice(&[0xAB; 8]);
///
/// let mut decoder = PacketDecoder::new(OffsetMode::Explicit);
/// let packet = decoder.decode(&datagram).expect("valid datagram");
/// assert_eq!(packet.offset().get(), 0);
/// assert_eq!(packet.len(), 8);
/// ```
#[derive(Clone, Debug, Default)]
pub struct PacketDecoder {
    mode: OffsetMode,
    unwrapper: SequenceUnwrapper,
}

impl PacketDecoder {
    /// Create a decoder for the given offset mode.
    #[must_use]
    pub fn new(mode: OffsetMode) -> Self {
        Self {
            mode,
            unwrapper: SequenceUnwrapper::default(),
        }
    }

    /// Offset mode used by this decoder.
    #[must_use]
    pub const fn mode(&self) -> OffsetMode { self.mode }

    /// Decode a datagram, copying its payload into an owned buffer.
    ///
    /// # Errors
    ///
    /// Returns a [`PacketError`] when the datagram is truncated, carries no
    /// payload, disagrees with the nominal payload size, precedes the
    /// sequence origin, or its offset arithmetic overflows.
    pub fn decode(&mut self, datagram: &[u8]) -> Result<Packet, PacketError> {
        let (header, payload) = PacketHeader::decode(datagram)?;
        let sequence = header.sequence();
        let offset = match self.mode {
            OffsetMode::Explicit => ByteOffset::new(header.byte_count()),
            OffsetMode::Derived {
                nominal_payload,
                sequence_origin,
            } => {
                if payload.len() != nominal_payload.get() {
                    return Err(PacketError::PayloadLengthMismatch {
                        sequence,
                        expected: nominal_payload.get(),
                        actual: payload.len(),
                    });
                }
                let extended = self.unwrapper.unwrap(sequence);
                let index = extended
                    .checked_sub(u64::from(sequence_origin))
                    .ok_or(PacketError::BeforeOrigin {
                        sequence,
                        origin: sequence_origin,
                    })?;
                let stride = u64::try_from(nominal_payload.get())
                    .map_err(|_| PacketError::OffsetOverflow { sequence })?;
                index
                    .checked_mul(stride)
                    .map(ByteOffset::new)
                    .ok_or(PacketError::OffsetOverflow { sequence })?
            }
        };
        Packet::new(sequence, offset, payload.to_vec())
    }
}
