//! Counters kept by the frame assembler.

/// Running totals of assembler outcomes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssemblerStats {
    /// Complete frames handed to the caller.
    pub frames_emitted: u64,
    /// Frame indices abandoned because of unrecoverable gaps.
    pub frames_discarded: u64,
    /// Packets whose bytes had all been consumed already.
    pub stale_packets: u64,
    /// Packets repeating an offset already buffered.
    pub duplicate_packets: u64,
    /// Packets evicted from a full reorder window.
    pub evicted_packets: u64,
    /// Buffered packets discarded while resynchronising.
    pub resync_discarded_packets: u64,
    /// Number of resynchronisations performed.
    pub resyncs: u64,
}

impl AssemblerStats {
    /// Packets that arrived but contributed nothing to an emitted frame
    /// through no fault of their encoding.
    #[must_use]
    pub const fn dropped_packets(&self) -> u64 {
        self.stale_packets
            + self.duplicate_packets
            + self.evicted_packets
            + self.resync_discarded_packets
    }
}
