//! Strongly typed positions within the capture stream.

use derive_more::{Display, From, Into};

/// Absolute position of a byte within the sample stream, counted from the
/// protocol's logical zero.
///
/// # Examples
///
/// ```
/// use adcframe::packet::ByteOffset;
/// let offset = ByteOffset::new(1024);
/// assert_eq!(offset.get(), 1024);
/// assert_eq!(offset.align_up(1000), Some(ByteOffset::new(2000)));
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into,
)]
#[display("{_0}")]
pub struct ByteOffset(u64);

impl ByteOffset {
    /// The logical start of the stream.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw byte offset.
    #[must_use]
    pub const fn new(value: u64) -> Self { Self(value) }

    /// Return the raw byte offset.
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }

    /// Advance by `len` bytes, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, len: u64) -> Option<Self> {
        match self.0.checked_add(len) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Advance by `len` bytes, saturating at `u64::MAX`.
    #[must_use]
    pub const fn saturating_add(self, len: u64) -> Self { Self(self.0.saturating_add(len)) }

    /// Round up to the next multiple of `stride`, returning `None` on overflow.
    ///
    /// A zero stride yields `None`.
    #[must_use]
    pub fn align_up(self, stride: u64) -> Option<Self> {
        if stride == 0 {
            return None;
        }
        self.0.checked_next_multiple_of(stride).map(Self)
    }

    /// Report whether the offset is a multiple of `stride`.
    #[must_use]
    pub fn is_aligned(self, stride: u64) -> bool { stride != 0 && self.0.is_multiple_of(stride) }
}

/// Wrapping 32-bit packet counter carried in each datagram header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, From, Into)]
#[display("{_0}")]
pub struct SequenceNumber(u32);

impl SequenceNumber {
    /// Wrap a raw sequence number.
    #[must_use]
    pub const fn new(value: u32) -> Self { Self(value) }

    /// Return the raw sequence number.
    #[must_use]
    pub const fn get(self) -> u32 { self.0 }
}
