//! Reassembly progress for the frame currently being filled.

use std::num::NonZeroUsize;

use bytes::{Bytes, BytesMut};

use super::{AssembledFrame, FrameIndex};
use crate::packet::ByteOffset;

/// Tracks the next expected byte and the partially filled frame.
///
/// `partial` never exceeds `frame_len` bytes and always holds the bytes
/// `frame_start..expected`.
#[derive(Debug)]
pub struct AssemblyCursor {
    expected: ByteOffset,
    frame_start: ByteOffset,
    frame_len: NonZeroUsize,
    partial: BytesMut,
}

impl AssemblyCursor {
    /// Create a cursor positioned at the session origin.
    #[must_use]
    pub fn new(frame_len: NonZeroUsize) -> Self {
        Self {
            expected: ByteOffset::ZERO,
            frame_start: ByteOffset::ZERO,
            frame_len,
            partial: BytesMut::with_capacity(frame_len.get()),
        }
    }

    /// Next byte offset the assembler needs.
    #[must_use]
    pub const fn expected(&self) -> ByteOffset { self.expected }

    /// Offset of the first byte of the current frame.
    #[must_use]
    pub const fn frame_start(&self) -> ByteOffset { self.frame_start }

    /// Fixed frame length in bytes.
    #[must_use]
    pub const fn frame_len(&self) -> NonZeroUsize { self.frame_len }

    /// Frame length as a byte-offset stride.
    #[must_use]
    pub const fn stride(&self) -> u64 { self.frame_len.get() as u64 }

    /// Index of the frame currently being filled or awaited.
    #[must_use]
    pub const fn current_frame_index(&self) -> FrameIndex {
        FrameIndex::new(self.frame_start.get() / self.stride())
    }

    /// Bytes accumulated for the current frame.
    #[must_use]
    pub fn filled(&self) -> usize { self.partial.len() }

    /// Copy as much of `bytes` as fits into the current frame.
    ///
    /// Returns the number of bytes consumed and, when the frame filled up,
    /// the completed frame. The cursor then points at the next frame.
    pub fn fill(&mut self, bytes: &[u8]) -> (usize, Option<AssembledFrame>) {
        let room = self.frame_len.get() - self.partial.len();
        let take = room.min(bytes.len());
        self.partial.extend_from_slice(&bytes[..take]);
        self.expected = self.expected.saturating_add(take as u64);

        if self.partial.len() < self.frame_len.get() {
            return (take, None);
        }
        let index = self.current_frame_index();
        let frame = AssembledFrame::new(index, self.take_partial());
        self.frame_start = self.frame_start.saturating_add(self.stride());
        (take, Some(frame))
    }

    /// Give up on the current frame, returning what was accumulated.
    pub fn abandon(&mut self) -> AssembledFrame {
        let index = self.current_frame_index();
        AssembledFrame::incomplete(index, self.take_partial())
    }

    /// Point the cursor at a new frame starting at `boundary`.
    ///
    /// Any partial bytes are dropped. `boundary` must not precede the
    /// current expected offset.
    pub fn restart_at(&mut self, boundary: ByteOffset) {
        debug_assert!(boundary >= self.expected, "expected offset never regresses");
        self.partial.clear();
        self.frame_start = boundary;
        self.expected = boundary;
    }

    fn take_partial(&mut self) -> Bytes {
        let bytes = self.partial.split().freeze();
        self.partial.reserve(self.frame_len.get());
        bytes
    }
}
