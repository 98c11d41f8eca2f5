//! Synthetic capture streams with verifiable contents.

use adcframe::packet::{ByteOffset, Packet, PacketHeader, SequenceNumber};
use bytes::{BufMut, Bytes, BytesMut};

/// Byte found at absolute `offset` of every synthetic stream.
///
/// 251 is prime, so the pattern never lines up with power-of-two frame or
/// packet sizes.
#[must_use]
pub fn pattern_byte(offset: u64) -> u8 { (offset % 251) as u8 }

/// Expected contents of frame `index` for frames of `frame_len` bytes.
#[must_use]
pub fn pattern_frame(index: u64, frame_len: usize) -> Vec<u8> {
    let start = index * frame_len as u64;
    (start..start + frame_len as u64).map(pattern_byte).collect()
}

/// One datagram's worth of a synthetic stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// Wire sequence number.
    pub sequence: u32,
    /// Absolute offset of the first payload byte.
    pub offset: u64,
    /// Payload bytes.
    pub payload: Bytes,
}

impl Chunk {
    /// Convert to a decoded packet.
    ///
    /// # Panics
    ///
    /// Panics if the payload is empty.
    #[must_use]
    pub fn to_packet(&self) -> Packet {
        Packet::new(
            SequenceNumber::new(self.sequence),
            ByteOffset::new(self.offset),
            self.payload.clone(),
        )
        .expect("synthetic chunks are never empty")
    }

    /// Encode as a raw-mode capture datagram.
    #[must_use]
    pub fn to_datagram(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(adcframe::packet::HEADER_LEN + self.payload.len());
        PacketHeader::new(SequenceNumber::new(self.sequence), self.offset).encode_into(&mut buf);
        buf.put_slice(&self.payload);
        buf.to_vec()
    }
}

/// Contiguous run of pattern bytes cut into datagram-sized chunks.
#[derive(Clone, Copy, Debug)]
pub struct CaptureStream {
    start: u64,
    len: u64,
    payload_len: usize,
    first_sequence: u32,
}

impl CaptureStream {
    /// Stream `len` bytes from absolute offset `start`, `payload_len` bytes
    /// per chunk. The last chunk may be shorter.
    ///
    /// # Panics
    ///
    /// Panics if `payload_len` is zero.
    #[must_use]
    pub fn new(start: u64, len: u64, payload_len: usize) -> Self {
        assert!(payload_len > 0, "payload length must be positive");
        Self {
            start,
            len,
            payload_len,
            first_sequence: 1,
        }
    }

    /// Number the first chunk `sequence` instead of 1.
    #[must_use]
    pub fn first_sequence(mut self, sequence: u32) -> Self {
        self.first_sequence = sequence;
        self
    }

    /// Cut the stream into chunks in transmission order.
    #[must_use]
    pub fn chunks(&self) -> Vec<Chunk> {
        let end = self.start + self.len;
        let mut chunks = Vec::new();
        let mut offset = self.start;
        let mut sequence = self.first_sequence;
        while offset < end {
            let chunk_end = (offset + self.payload_len as u64).min(end);
            chunks.push(Chunk {
                sequence,
                offset,
                payload: (offset..chunk_end).map(pattern_byte).collect(),
            });
            offset = chunk_end;
            sequence = sequence.wrapping_add(1);
        }
        chunks
    }

    /// Cut the stream into chunks of the given sizes, cycling through
    /// `sizes` until the stream is exhausted.
    ///
    /// # Panics
    ///
    /// Panics if `sizes` is empty or contains a zero.
    #[must_use]
    pub fn chunks_sized(&self, sizes: &[usize]) -> Vec<Chunk> {
        assert!(
            !sizes.is_empty() && sizes.iter().all(|&size| size > 0),
            "chunk sizes must be positive"
        );
        let end = self.start + self.len;
        let mut chunks = Vec::new();
        let mut offset = self.start;
        let mut sequence = self.first_sequence;
        for &size in sizes.iter().cycle() {
            if offset >= end {
                break;
            }
            let chunk_end = (offset + size as u64).min(end);
            chunks.push(Chunk {
                sequence,
                offset,
                payload: (offset..chunk_end).map(pattern_byte).collect(),
            });
            offset = chunk_end;
            sequence = sequence.wrapping_add(1);
        }
        chunks
    }
}

/// Shuffle `items` so that none moves more than `depth` places.
///
/// Item `i` is ordered by `i + delays[i] % (depth + 1)`, with ties keeping
/// their original order. Missing delays count as zero.
#[must_use]
pub fn reorder_within<T>(items: Vec<T>, delays: &[usize], depth: usize) -> Vec<T> {
    let mut keyed: Vec<(usize, T)> = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| (i + delays.get(i).copied().unwrap_or(0) % (depth + 1), item))
        .collect();
    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, item)| item).collect()
}
