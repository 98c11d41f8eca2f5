//! Extension of the wrapping 32-bit packet counter to a monotonic 64-bit
//! sequence.

use super::SequenceNumber;

/// Tracks the highest sequence seen so far and maps each wrapping 32-bit
/// sequence number onto the 64-bit value nearest to it.
///
/// Sequence numbers within `i32::MAX` of the highest value seen are taken
/// to be reordered or advancing packets of the same stream, so a counter
/// wrap from `u32::MAX` to `0` keeps counting upwards.
///
/// # Examples
///
/// ```
/// use adcframe::packet::{SequenceNumber, SequenceUnwrapper};
///
/// let mut unwrapper = SequenceUnwrapper::default();
/// assert_eq!(unwrapper.unwrap(SequenceNumber::new(u32::MAX)), u64::from(u32::MAX));
/// assert_eq!(unwrapper.unwrap(SequenceNumber::new(0)), 1 << 32);
/// assert_eq!(unwrapper.unwrap(SequenceNumber::new(u32::MAX)), u64::from(u32::MAX));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct SequenceUnwrapper {
    highest: Option<u64>,
}

impl SequenceUnwrapper {
    /// Extend `sequence` relative to the highest value seen.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        reason = "wrapping difference of the low 32 bits is the signed distance"
    )]
    pub fn unwrap(&mut self, sequence: SequenceNumber) -> u64 {
        let raw = u64::from(sequence.get());
        let Some(highest) = self.highest else {
            self.highest = Some(raw);
            return raw;
        };
        let distance = sequence.get().wrapping_sub(highest as u32) as i32;
        let extended = highest.checked_add_signed(i64::from(distance)).unwrap_or(raw);
        if extended > highest {
            self.highest = Some(extended);
        }
        extended
    }

    /// Highest extended sequence seen so far.
    #[must_use]
    pub const fn highest(&self) -> Option<u64> { self.highest }
}
