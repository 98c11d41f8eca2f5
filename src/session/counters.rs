//! Counters shared between the ingestion task and the session handle.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::assembler::AssemblerStats;

/// Global count of running capture sessions.
static ACTIVE_SESSIONS: AtomicU64 = AtomicU64::new(0);

/// RAII guard counting a running ingestion task.
pub(super) struct ActiveSession;

impl ActiveSession {
    pub(super) fn new() -> Self {
        ACTIVE_SESSIONS.fetch_add(1, Ordering::Relaxed);
        crate::metrics::inc_sessions();
        Self
    }
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        ACTIVE_SESSIONS.fetch_sub(1, Ordering::Relaxed);
        crate::metrics::dec_sessions();
    }
}

/// Return the number of ingestion tasks currently running.
#[must_use]
pub fn active_session_count() -> u64 { ACTIVE_SESSIONS.load(Ordering::Relaxed) }

/// Atomics the ingestion task publishes after every step.
#[derive(Debug, Default)]
pub(super) struct SessionCounters {
    datagrams: AtomicU64,
    malformed: AtomicU64,
    frames_emitted: AtomicU64,
    frames_discarded: AtomicU64,
    stale: AtomicU64,
    duplicate: AtomicU64,
    evicted: AtomicU64,
    resync_discarded: AtomicU64,
    resyncs: AtomicU64,
}

impl SessionCounters {
    pub(super) fn record_datagram(&self) { self.datagrams.fetch_add(1, Ordering::Relaxed); }

    pub(super) fn record_malformed(&self) { self.malformed.fetch_add(1, Ordering::Relaxed); }

    pub(super) fn publish(&self, stats: &AssemblerStats) {
        self.frames_emitted
            .store(stats.frames_emitted, Ordering::Relaxed);
        self.frames_discarded
            .store(stats.frames_discarded, Ordering::Relaxed);
        self.stale.store(stats.stale_packets, Ordering::Relaxed);
        self.duplicate
            .store(stats.duplicate_packets, Ordering::Relaxed);
        self.evicted.store(stats.evicted_packets, Ordering::Relaxed);
        self.resync_discarded
            .store(stats.resync_discarded_packets, Ordering::Relaxed);
        self.resyncs.store(stats.resyncs, Ordering::Relaxed);
    }

    pub(super) fn snapshot(&self, sink_dropped_frames: u64) -> SessionStats {
        SessionStats {
            datagrams_received: self.datagrams.load(Ordering::Relaxed),
            malformed_packets: self.malformed.load(Ordering::Relaxed),
            assembler: AssemblerStats {
                frames_emitted: self.frames_emitted.load(Ordering::Relaxed),
                frames_discarded: self.frames_discarded.load(Ordering::Relaxed),
                stale_packets: self.stale.load(Ordering::Relaxed),
                duplicate_packets: self.duplicate.load(Ordering::Relaxed),
                evicted_packets: self.evicted.load(Ordering::Relaxed),
                resync_discarded_packets: self.resync_discarded.load(Ordering::Relaxed),
                resyncs: self.resyncs.load(Ordering::Relaxed),
            },
            sink_dropped_frames,
        }
    }
}

/// Point-in-time view of a session's counters.
///
/// Fields are loaded individually, so a snapshot taken while the session
/// runs may mix values from adjacent steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Datagrams read from the source.
    pub datagrams_received: u64,
    /// Datagrams that could not be decoded into a packet.
    pub malformed_packets: u64,
    /// Totals reported by the frame assembler.
    pub assembler: AssemblerStats,
    /// Complete frames dropped by the sink policy.
    pub sink_dropped_frames: u64,
}

impl SessionStats {
    /// Frames lost to gaps or to a full sink.
    #[must_use]
    pub const fn dropped_frames(&self) -> u64 {
        self.assembler.frames_discarded + self.sink_dropped_frames
    }

    /// Datagrams that contributed nothing to an emitted frame.
    #[must_use]
    pub const fn dropped_packets(&self) -> u64 {
        self.malformed_packets + self.assembler.dropped_packets()
    }

    /// Complete frames that reached the receiver's queue and stayed there.
    #[must_use]
    pub const fn frames_delivered(&self) -> u64 {
        self.assembler
            .frames_emitted
            .saturating_sub(self.sink_dropped_frames)
    }
}
