//! Bounded buffer for packets that arrive ahead of the expected offset.
//!
//! Capture hardware reorders shallowly, so a small window keyed by byte
//! offset is enough to restore stream order. The window also keeps the gap
//! clock: how long, and across how many admitted packets, the byte at the
//! expected offset has been missing. A gap that outlives either bound, or
//! that would force a buffered packet out of a full window, is
//! unrecoverable and the assembler resynchronises.

mod config;

use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

pub use config::ReorderConfig;

use crate::packet::{ByteOffset, Packet};

/// Result of admitting a packet into the window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Admission {
    /// The packet was buffered.
    Buffered,
    /// The packet was buffered after evicting the lowest-offset packet.
    BufferedWithEviction(Packet),
    /// A packet with the same offset is already buffered.
    Duplicate,
    /// Every byte of the packet precedes the expected offset.
    Stale,
}

#[derive(Clone, Copy, Debug)]
struct GapClock {
    opened_at: Instant,
    admitted: usize,
}

/// Offset-keyed reorder window with a gap clock.
#[derive(Debug)]
pub struct ReorderWindow {
    config: ReorderConfig,
    packets: BTreeMap<ByteOffset, Packet>,
    gap: Option<GapClock>,
}

impl ReorderWindow {
    /// Create an empty window.
    #[must_use]
    pub fn new(config: ReorderConfig) -> Self {
        Self {
            config,
            packets: BTreeMap::new(),
            gap: None,
        }
    }

    /// Configuration bounding this window.
    #[must_use]
    pub const fn config(&self) -> &ReorderConfig { &self.config }

    /// Buffer `packet` unless it is stale or a duplicate.
    ///
    /// A packet covering `expected` is always accepted, since the caller
    /// consumes it at once. Any other packet arriving at a full window
    /// evicts the lowest-offset packet first; callers avoid this by checking
    /// [`ReorderWindow::would_overflow`] and resynchronising beforehand. The
    /// gap clock starts when a packet lands strictly ahead of `expected`.
    pub fn admit(&mut self, packet: Packet, expected: ByteOffset, now: Instant) -> Admission {
        if packet.end() <= expected {
            return Admission::Stale;
        }
        if self.packets.contains_key(&packet.offset()) {
            return Admission::Duplicate;
        }

        let evicted = if self.is_full() && !packet.covers(expected) {
            self.packets.pop_first().map(|(_, evicted)| evicted)
        } else {
            None
        };

        let ahead = packet.offset() > expected;
        self.packets.insert(packet.offset(), packet);
        if ahead {
            self.gap
                .get_or_insert(GapClock {
                    opened_at: now,
                    admitted: 0,
                })
                .admitted += 1;
        }

        match evicted {
            Some(evicted) => Admission::BufferedWithEviction(evicted),
            None => Admission::Buffered,
        }
    }

    /// Remove and return the packet carrying the byte at `expected`.
    ///
    /// The exact-offset packet is the common case; a packet that starts
    /// earlier but extends past `expected` also qualifies.
    pub fn take_next(&mut self, expected: ByteOffset) -> Option<Packet> {
        let (&offset, candidate) = self.packets.range(..=expected).next_back()?;
        if !candidate.covers(expected) {
            return None;
        }
        let packet = self.packets.remove(&offset);
        if self.packets.is_empty() {
            self.gap = None;
        }
        packet
    }

    /// Drop leading packets that end at or before `expected`.
    ///
    /// Returns the number of packets removed.
    pub fn prune_stale(&mut self, expected: ByteOffset) -> usize {
        let mut pruned = 0;
        while let Some(entry) = self.packets.first_entry() {
            if entry.get().end() > expected {
                break;
            }
            entry.remove();
            pruned += 1;
        }
        if self.packets.is_empty() {
            self.gap = None;
        }
        pruned
    }

    /// Drop every packet whose payload ends at or before `boundary`.
    ///
    /// Returns the number of packets removed.
    pub fn discard_below(&mut self, boundary: ByteOffset) -> usize {
        let before = self.packets.len();
        self.packets.retain(|_, packet| packet.end() > boundary);
        if self.packets.is_empty() {
            self.gap = None;
        }
        before - self.packets.len()
    }

    /// Restart the gap clock after progress or a resync.
    pub fn restart_gap_clock(&mut self, now: Instant) {
        self.gap = (!self.packets.is_empty()).then_some(GapClock {
            opened_at: now,
            admitted: 0,
        });
    }

    /// Report whether admitting `packet` would push a buffered packet out.
    ///
    /// True when the window already holds `capacity` packets and `packet`
    /// is neither stale, a duplicate, nor the one covering `expected`. The
    /// gap at `expected` can then no longer be filled within the window.
    #[must_use]
    pub fn would_overflow(&self, packet: &Packet, expected: ByteOffset) -> bool {
        self.is_full()
            && packet.end() > expected
            && !packet.covers(expected)
            && !self.packets.contains_key(&packet.offset())
    }

    /// Report whether the buffered packets have waited too long for the
    /// expected offset to arrive.
    ///
    /// The gap is lost once more than `gap_packet_limit` packets were
    /// admitted ahead of it, or once `gap_timeout` elapsed since the clock
    /// started. A full window alone is not a lost gap.
    #[must_use]
    pub fn has_gap_timed_out(&self, now: Instant) -> bool {
        let Some(clock) = self.gap else {
            return false;
        };
        if self.packets.is_empty() {
            return false;
        }
        clock.admitted > self.config.gap_packet_limit.get()
            || now.saturating_duration_since(clock.opened_at) >= self.config.gap_timeout
    }

    /// Time the current gap has been open, if any.
    #[must_use]
    pub fn gap_age(&self, now: Instant) -> Option<Duration> {
        self.gap
            .map(|clock| now.saturating_duration_since(clock.opened_at))
    }

    /// Offset of the lowest buffered packet.
    #[must_use]
    pub fn lowest_offset(&self) -> Option<ByteOffset> { self.packets.keys().next().copied() }

    /// Number of buffered packets.
    #[must_use]
    pub fn len(&self) -> usize { self.packets.len() }

    /// Report whether no packets are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.packets.is_empty() }

    fn is_full(&self) -> bool { self.packets.len() >= self.config.capacity.get() }

    /// Drop every buffered packet and stop the gap clock.
    ///
    /// Returns the number of packets removed.
    pub fn clear(&mut self) -> usize {
        let dropped = self.packets.len();
        self.packets.clear();
        self.gap = None;
        dropped
    }
}

#[cfg(test)]
mod tests;
