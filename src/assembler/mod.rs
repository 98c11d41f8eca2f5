//! Frame reassembly from reordered, lossy packet streams.
//!
//! [`FrameAssembler`] owns the reorder window and the assembly cursor. Each
//! admitted packet is buffered, every packet that now covers the expected
//! offset is copied into the current frame, and completed frames are
//! appended to the caller's output vector. A packet may complete one frame
//! and seed the next.
//!
//! When the window reports a lost gap, or a new packet would overflow it,
//! the partial frame is discarded and the assembler realigns to the next
//! frame boundary it can still fill. Frames skipped because the stream start
//! was never observed are counted as discarded too.
//! Frame indices are absolute (`frame_start / frame_len`), so every
//! abandoned frame still consumes its index and consumers can spot the hole.

mod cursor;
mod error;
mod frame;
mod state;
mod stats;

use std::{num::NonZeroUsize, time::Instant};

pub use cursor::AssemblyCursor;
pub use error::AssemblyError;
pub use frame::{AssembledFrame, FrameIndex};
pub use state::AssemblerState;
pub use stats::AssemblerStats;
use tracing::{debug, warn};

use crate::{
    metrics,
    packet::{ByteOffset, Packet},
    reorder::{Admission, ReorderConfig, ReorderWindow},
};

/// Stateful core turning packets into fixed-length frames.
///
/// # Examples
///
/// ```
/// use std::{num::NonZeroUsize, time::Duration};
///
/// use adcframe::{
///     assembler::FrameAssembler,
///     packet::{ByteOffset, Packet, SequenceNumber},
///     reorder::ReorderConfig,
/// };
///
/// let frame_len = NonZeroUsize::new(1024).expect("non-zero");
/// let reorder = ReorderConfig::new(
///     NonZeroUsize::new(8).expect("non-zero"),
///     Duration::from_millis(50),
/// );
/// let mut assembler = FrameAssembler::new(frame_len, reorder);
/// let mut frames = Vec::new();
///
/// for (seq, offset, len) in [(0, 0, 512), (1, 512, 256), (2, 768, 256)] {
///     let packet = Packet::new(SequenceNumber::new(seq), ByteOffset::new(offset), vec![7_u8; len])
///         .expect("valid packet");
///     assembler.push(packet, &mut frames).expect("assembler open");
/// }
///
/// assert_eq!(frames.len(), 1);
/// assert_eq!(frames[0].index().get(), 0);
/// assert_eq!(frames[0].len(), 1024);
/// ```
#[derive(Debug)]
pub struct FrameAssembler {
    cursor: AssemblyCursor,
    window: ReorderWindow,
    state: AssemblerState,
    stats: AssemblerStats,
}

impl FrameAssembler {
    /// Create an assembler for frames of `frame_len` bytes.
    #[must_use]
    pub fn new(frame_len: NonZeroUsize, reorder: ReorderConfig) -> Self {
        Self {
            cursor: AssemblyCursor::new(frame_len),
            window: ReorderWindow::new(reorder),
            state: AssemblerState::AwaitingFirstPacket,
            stats: AssemblerStats::default(),
        }
    }

    /// Feed a packet using the current time.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::Closed`] once [`FrameAssembler::stop`] ran.
    pub fn push(
        &mut self,
        packet: Packet,
        out: &mut Vec<AssembledFrame>,
    ) -> Result<(), AssemblyError> {
        self.push_at(packet, Instant::now(), out)
    }

    /// Feed a packet using an explicit clock reading.
    ///
    /// Completed frames are appended to `out` in increasing index order.
    /// Accepting `now` keeps gap handling deterministic under test.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::Closed`] once [`FrameAssembler::stop`] ran.
    pub fn push_at(
        &mut self,
        packet: Packet,
        now: Instant,
        out: &mut Vec<AssembledFrame>,
    ) -> Result<(), AssemblyError> {
        if self.state.is_closed() {
            return Err(AssemblyError::Closed);
        }

        if self.window.would_overflow(&packet, self.cursor.expected()) {
            debug!(
                offset = %packet.offset(),
                expected = %self.cursor.expected(),
                "reorder window full; gap cannot be filled"
            );
            self.resync(now);
            self.drain(now, out);
        }

        let sequence = packet.sequence();
        match self.window.admit(packet, self.cursor.expected(), now) {
            Admission::Buffered => {}
            Admission::BufferedWithEviction(evicted) => {
                self.stats.evicted_packets += 1;
                metrics::inc_packets_dropped("evicted");
                debug!(offset = %evicted.offset(), "reorder window full; evicted packet");
            }
            Admission::Duplicate => {
                self.stats.duplicate_packets += 1;
                metrics::inc_packets_dropped("duplicate");
                debug!(%sequence, "duplicate packet dropped");
            }
            Admission::Stale => {
                self.stats.stale_packets += 1;
                metrics::inc_packets_dropped("stale");
                debug!(%sequence, "stale packet dropped");
            }
        }

        self.drain(now, out);
        self.poll_gap_at(now, out);
        Ok(())
    }

    /// Check for a lost gap without feeding a packet.
    ///
    /// Lets the owner expire gaps while the source is idle. Frames completed
    /// by packets buffered beyond the new boundary are appended to `out`.
    /// Returns `true` when a resynchronisation happened.
    pub fn poll_gap_at(&mut self, now: Instant, out: &mut Vec<AssembledFrame>) -> bool {
        if self.state.is_closed() || !self.window.has_gap_timed_out(now) {
            return false;
        }
        self.resync(now);
        self.drain(now, out);
        true
    }

    /// Stop the assembler, discarding any partial frame and buffered packets.
    ///
    /// Safe to call repeatedly and before any packet arrived.
    pub fn stop(&mut self) {
        if self.state.is_closed() {
            return;
        }
        let flushed = self.cursor.abandon();
        let buffered = self.window.clear();
        if !flushed.is_empty() || buffered > 0 {
            debug!(
                frame = %flushed.index(),
                filled = flushed.len(),
                buffered,
                "discarding in-progress frame on stop"
            );
        }
        self.state = AssemblerState::Closed;
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> AssemblerState { self.state }

    /// Next byte offset required to make progress.
    #[must_use]
    pub const fn expected_offset(&self) -> ByteOffset { self.cursor.expected() }

    /// Index of the frame being filled or awaited.
    #[must_use]
    pub const fn current_frame_index(&self) -> FrameIndex { self.cursor.current_frame_index() }

    /// Fixed frame length in bytes.
    #[must_use]
    pub const fn frame_len(&self) -> NonZeroUsize { self.cursor.frame_len() }

    /// Number of packets waiting in the reorder window.
    #[must_use]
    pub fn buffered_len(&self) -> usize { self.window.len() }

    /// Running totals of assembler outcomes.
    #[must_use]
    pub const fn stats(&self) -> AssemblerStats { self.stats }

    fn drain(&mut self, now: Instant, out: &mut Vec<AssembledFrame>) {
        let mut progressed = false;
        loop {
            let pruned = self.window.prune_stale(self.cursor.expected());
            if pruned > 0 {
                self.stats.stale_packets += pruned as u64;
                metrics::inc_packets_dropped_by("stale", pruned as u64);
            }
            let Some(packet) = self.window.take_next(self.cursor.expected()) else {
                break;
            };
            self.consume(&packet, out);
            progressed = true;
        }
        if progressed {
            self.window.restart_gap_clock(now);
        }
    }

    fn consume(&mut self, packet: &Packet, out: &mut Vec<AssembledFrame>) {
        let skip = self.cursor.expected().get() - packet.offset().get();
        let Ok(skip) = usize::try_from(skip) else {
            return;
        };
        if !matches!(self.state, AssemblerState::Accumulating) {
            debug!(
                frame = %self.cursor.current_frame_index(),
                offset = %self.cursor.expected(),
                "accumulating from frame boundary"
            );
            self.state = AssemblerState::Accumulating;
        }

        let mut remaining = &packet.payload()[skip..];
        while !remaining.is_empty() {
            let (taken, completed) = self.cursor.fill(remaining);
            remaining = &remaining[taken..];
            if let Some(frame) = completed {
                self.stats.frames_emitted += 1;
                metrics::inc_frames(metrics::FrameOutcome::Emitted);
                out.push(frame);
            }
        }
    }

    fn resync(&mut self, now: Instant) {
        let Some(lowest) = self.window.lowest_offset() else {
            return;
        };
        let stride = self.cursor.stride();
        let lowest_boundary = boundary_at_or_after(lowest, stride);

        let boundary = match self.state {
            AssemblerState::Closed => return,
            AssemblerState::AwaitingFirstPacket => {
                let dropped = lowest_boundary.get() / stride;
                self.stats.frames_discarded += dropped;
                self.stats.resyncs += 1;
                metrics::inc_frames_by(metrics::FrameOutcome::Discarded, dropped);
                warn!(
                    boundary = %lowest_boundary,
                    count = dropped,
                    "stream start not observed; attaching at next frame boundary"
                );
                lowest_boundary
            }
            AssemblerState::Accumulating | AssemblerState::Resyncing { .. } => {
                let frame_start = self.cursor.frame_start();
                let boundary = frame_start.saturating_add(stride).max(lowest_boundary);
                let abandoned = self.cursor.abandon();
                let dropped = (boundary.get() - frame_start.get()) / stride;
                self.stats.frames_discarded += dropped;
                self.stats.resyncs += 1;
                metrics::inc_frames_by(metrics::FrameOutcome::Discarded, dropped);
                warn!(
                    first = %abandoned.index(),
                    count = dropped,
                    filled = abandoned.len(),
                    complete = abandoned.is_complete(),
                    "dropped incomplete frame(s)"
                );
                boundary
            }
        };

        let discarded = self.window.discard_below(boundary);
        if discarded > 0 {
            self.stats.resync_discarded_packets += discarded as u64;
            metrics::inc_packets_dropped_by("resync", discarded as u64);
        }
        self.cursor.restart_at(boundary);
        self.state = AssemblerState::Resyncing { boundary };
        self.window.restart_gap_clock(now);
    }
}

/// First multiple of `stride` at or after `offset`, clamped to the last
/// representable boundary.
fn boundary_at_or_after(offset: ByteOffset, stride: u64) -> ByteOffset {
    offset
        .align_up(stride)
        .unwrap_or_else(|| ByteOffset::new(u64::MAX - u64::MAX % stride))
}

#[cfg(test)]
mod tests;
