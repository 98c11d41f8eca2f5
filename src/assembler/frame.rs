//! Frames produced by the assembler.

use bytes::Bytes;
use derive_more::{Display, From, Into};

/// Position of a frame within the stream, counted from the protocol's
/// logical zero.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into,
)]
#[display("{_0}")]
pub struct FrameIndex(u64);

impl FrameIndex {
    /// Wrap a raw frame index.
    #[must_use]
    pub const fn new(value: u64) -> Self { Self(value) }

    /// Return the raw frame index.
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }
}

/// One logical frame of raw sample bytes.
///
/// Frames handed to the sink are always complete: `bytes` holds exactly the
/// session's frame length in stream order. Incomplete frames exist only
/// transiently while the assembler discards them.
///
/// # Examples
///
/// ```
/// use adcframe::assembler::{AssembledFrame, FrameIndex};
///
/// let frame = AssembledFrame::new(FrameIndex::new(2), vec![0_u8; 1024]);
/// assert_eq!(frame.index().get(), 2);
/// assert_eq!(frame.len(), 1024);
/// assert!(frame.is_complete());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssembledFrame {
    index: FrameIndex,
    bytes: Bytes,
    complete: bool,
}

impl AssembledFrame {
    /// Create a complete frame.
    #[must_use]
    pub fn new(index: FrameIndex, bytes: impl Into<Bytes>) -> Self {
        Self {
            index,
            bytes: bytes.into(),
            complete: true,
        }
    }

    pub(crate) fn incomplete(index: FrameIndex, bytes: Bytes) -> Self {
        Self {
            index,
            bytes,
            complete: false,
        }
    }

    /// Index of the frame within the stream.
    #[must_use]
    pub const fn index(&self) -> FrameIndex { self.index }

    /// Borrow the frame bytes.
    #[must_use]
    pub fn bytes(&self) -> &Bytes { &self.bytes }

    /// Number of bytes held.
    #[must_use]
    pub fn len(&self) -> usize { self.bytes.len() }

    /// Report whether the frame holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    /// Report whether every byte of the frame was received.
    #[must_use]
    pub const fn is_complete(&self) -> bool { self.complete }

    /// Consume the frame, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Bytes { self.bytes }
}
