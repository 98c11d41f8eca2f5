//! Metric helpers for `adcframe`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. With the `metrics` feature
//! disabled every helper compiles to a no-op so call sites stay unconditional.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Name of the gauge tracking running capture sessions.
pub const SESSIONS_ACTIVE: &str = "adcframe_sessions_active";
/// Name of the counter tracking frame outcomes.
pub const FRAMES_TOTAL: &str = "adcframe_frames_total";
/// Name of the counter tracking packets that contributed nothing to a frame.
pub const PACKETS_DROPPED: &str = "adcframe_packets_dropped_total";

/// What happened to a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A complete frame left the assembler.
    Emitted,
    /// A frame index was abandoned because of an unrecoverable gap.
    Discarded,
    /// A complete frame was dropped by the sink policy.
    SinkDropped,
}

impl FrameOutcome {
    /// Label value recorded for this outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FrameOutcome::Emitted => "emitted",
            FrameOutcome::Discarded => "discarded",
            FrameOutcome::SinkDropped => "sink_dropped",
        }
    }
}

/// Increment the active sessions gauge.
pub fn inc_sessions() {
    #[cfg(feature = "metrics")]
    gauge!(SESSIONS_ACTIVE).increment(1.0);
}

/// Decrement the active sessions gauge.
pub fn dec_sessions() {
    #[cfg(feature = "metrics")]
    gauge!(SESSIONS_ACTIVE).decrement(1.0);
}

/// Record one frame with the given outcome.
pub fn inc_frames(outcome: FrameOutcome) { inc_frames_by(outcome, 1); }

/// Record `count` frames with the given outcome.
pub fn inc_frames_by(outcome: FrameOutcome, count: u64) {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_TOTAL, "outcome" => outcome.as_str()).increment(count);
    #[cfg(not(feature = "metrics"))]
    let _ = (outcome, count);
}

/// Record one dropped packet under `reason`.
pub fn inc_packets_dropped(reason: &'static str) { inc_packets_dropped_by(reason, 1); }

/// Record `count` dropped packets under `reason`.
pub fn inc_packets_dropped_by(reason: &'static str, count: u64) {
    #[cfg(feature = "metrics")]
    counter!(PACKETS_DROPPED, "reason" => reason).increment(count);
    #[cfg(not(feature = "metrics"))]
    let _ = (reason, count);
}
