//! Raw-mode datagram header emitted by DCA1000-class capture boards.
//!
//! Layout: a little-endian `u32` sequence number, a little-endian 48-bit
//! count of payload bytes sent before this datagram, then the payload.

use bytes::{Buf, BufMut};

use super::{PacketError, SequenceNumber};

/// Size of the header preceding every payload.
pub const HEADER_LEN: usize = 10;
/// Largest datagram the capture board emits.
pub const MAX_DATAGRAM_LEN: usize = 4096;
/// Payload carried by a full-size datagram at the board's default packet size.
pub const NOMINAL_PAYLOAD_LEN: usize = 1456;

const BYTE_COUNT_LEN: usize = 6;
const BYTE_COUNT_MAX: u64 = (1 << 48) - 1;

/// Decoded datagram header.
///
/// # Examples
///
/// ```
/// use adcframe::packet::{PacketHeader, SequenceNumber};
///
/// let mut datagram = Vec::new();
/// PacketHeader::new(SequenceNumber::new(7), 2912).encode_into(&mut datagram);
/// datagram.extend_from_slice(&[1, 2, 3, 4]);
///
/// let (header, payload) = PacketHeader::decode(&datagram).expect("valid datagram");
/// assert_eq!(header.sequence().get(), 7);
/// assert_eq!(header.byte_count(), 2912);
/// assert_eq!(payload, &[1, 2, 3, 4]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacketHeader {
    sequence: SequenceNumber,
    byte_count: u64,
}

impl PacketHeader {
    /// Create a header. `byte_count` is truncated to 48 bits when encoded.
    #[must_use]
    pub const fn new(sequence: SequenceNumber, byte_count: u64) -> Self {
        Self {
            sequence,
            byte_count,
        }
    }

    /// Sequence number of the datagram.
    #[must_use]
    pub const fn sequence(&self) -> SequenceNumber { self.sequence }

    /// Bytes sent before this datagram's payload.
    #[must_use]
    pub const fn byte_count(&self) -> u64 { self.byte_count }

    /// Split a datagram into its header and payload.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::Truncated`] when the datagram is shorter than
    /// [`HEADER_LEN`].
    pub fn decode(datagram: &[u8]) -> Result<(Self, &[u8]), PacketError> {
        if datagram.len() < HEADER_LEN {
            return Err(PacketError::Truncated {
                len: datagram.len(),
            });
        }
        let (mut head, payload) = datagram.split_at(HEADER_LEN);
        let sequence = SequenceNumber::new(head.get_u32_le());
        let byte_count = head.get_uint_le(BYTE_COUNT_LEN);
        Ok((Self::new(sequence, byte_count), payload))
    }

    /// Append the encoded header to `buf`.
    pub fn encode_into(&self, buf: &mut impl BufMut) {
        buf.put_u32_le(self.sequence.get());
        buf.put_uint_le(self.byte_count & BYTE_COUNT_MAX, BYTE_COUNT_LEN);
    }
}
