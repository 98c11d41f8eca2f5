//! Bounds applied to the reorder window.

use std::{num::NonZeroUsize, time::Duration};

/// Settings that bound reorder window memory and gap tolerance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReorderConfig {
    /// Maximum number of packets held ahead of the expected offset.
    pub capacity: NonZeroUsize,
    /// Wall-clock time a gap may stay open before it is declared lost.
    pub gap_timeout: Duration,
    /// Number of packets that may be admitted ahead of an open gap before it
    /// is declared lost.
    pub gap_packet_limit: NonZeroUsize,
}

impl ReorderConfig {
    /// Create a configuration whose packet limit equals the capacity.
    #[must_use]
    pub const fn new(capacity: NonZeroUsize, gap_timeout: Duration) -> Self {
        Self {
            capacity,
            gap_timeout,
            gap_packet_limit: capacity,
        }
    }

    /// Override the number of packets tolerated ahead of an open gap.
    #[must_use]
    pub const fn with_gap_packet_limit(mut self, limit: NonZeroUsize) -> Self {
        self.gap_packet_limit = limit;
        self
    }
}
