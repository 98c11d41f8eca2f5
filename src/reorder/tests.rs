//! Tests for reorder window admission, lookup and gap detection.

use std::{
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use rstest::{fixture, rstest};

use super::{Admission, ReorderConfig, ReorderWindow};
use crate::packet::{ByteOffset, Packet, SequenceNumber};

fn packet(offset: u64, len: usize) -> Packet {
    Packet::new(SequenceNumber::new(0), ByteOffset::new(offset), vec![0_u8; len])
        .expect("valid packet")
}

fn config(capacity: usize, timeout_ms: u64) -> ReorderConfig {
    ReorderConfig::new(
        NonZeroUsize::new(capacity).expect("non-zero"),
        Duration::from_millis(timeout_ms),
    )
}

#[fixture]
fn window() -> ReorderWindow { ReorderWindow::new(config(4, 50)) }

#[rstest]
fn admits_packet_ahead_and_returns_it_when_expected(mut window: ReorderWindow) {
    let now = Instant::now();
    assert_eq!(
        window.admit(packet(512, 256), ByteOffset::ZERO, now),
        Admission::Buffered
    );
    assert!(window.take_next(ByteOffset::ZERO).is_none());
    let taken = window
        .take_next(ByteOffset::new(512))
        .expect("packet at 512 buffered");
    assert_eq!(taken.offset(), ByteOffset::new(512));
    assert!(window.is_empty());
}

#[rstest]
fn rejects_stale_and_duplicate_packets(mut window: ReorderWindow) {
    let now = Instant::now();
    let expected = ByteOffset::new(1024);
    assert_eq!(
        window.admit(packet(768, 256), expected, now),
        Admission::Stale
    );
    assert_eq!(
        window.admit(packet(2048, 256), expected, now),
        Admission::Buffered
    );
    assert_eq!(
        window.admit(packet(2048, 256), expected, now),
        Admission::Duplicate
    );
    assert_eq!(window.len(), 1);
}

#[rstest]
fn keeps_packet_straddling_expected_offset(mut window: ReorderWindow) {
    let now = Instant::now();
    let expected = ByteOffset::new(1024);
    assert_eq!(
        window.admit(packet(1000, 100), expected, now),
        Admission::Buffered
    );
    let taken = window.take_next(expected).expect("straddling packet covers 1024");
    assert_eq!(taken.offset(), ByteOffset::new(1000));
}

#[rstest]
fn full_window_evicts_lowest_offset(mut window: ReorderWindow) {
    let now = Instant::now();
    for offset in [400, 100, 300, 200] {
        window.admit(packet(offset, 100), ByteOffset::ZERO, now);
    }
    match window.admit(packet(500, 100), ByteOffset::ZERO, now) {
        Admission::BufferedWithEviction(evicted) => {
            assert_eq!(evicted.offset(), ByteOffset::new(100));
        }
        other => panic!("expected eviction, got {other:?}"),
    }
    assert_eq!(window.len(), 4);
    assert_eq!(window.lowest_offset(), Some(ByteOffset::new(200)));
}

#[rstest]
fn gap_times_out_after_wall_clock_bound(mut window: ReorderWindow) {
    let start = Instant::now();
    window.admit(packet(256, 256), ByteOffset::ZERO, start);
    assert!(!window.has_gap_timed_out(start + Duration::from_millis(49)));
    assert!(window.has_gap_timed_out(start + Duration::from_millis(50)));
}

#[test]
fn gap_times_out_after_packet_bound() {
    let mut window = ReorderWindow::new(
        config(16, 10_000).with_gap_packet_limit(NonZeroUsize::new(3).expect("non-zero")),
    );
    let now = Instant::now();
    for offset in [100, 200, 300] {
        window.admit(packet(offset, 100), ByteOffset::ZERO, now);
    }
    assert!(!window.has_gap_timed_out(now));
    window.admit(packet(400, 100), ByteOffset::ZERO, now);
    assert!(window.has_gap_timed_out(now));
}

#[rstest]
fn full_window_still_waits_for_the_gap(mut window: ReorderWindow) {
    let now = Instant::now();
    for offset in [100, 200, 300, 400] {
        window.admit(packet(offset, 100), ByteOffset::ZERO, now);
    }
    assert_eq!(window.len(), 4);
    assert!(!window.has_gap_timed_out(now));
    assert!(!window.would_overflow(&packet(0, 100), ByteOffset::ZERO));
    assert!(!window.would_overflow(&packet(300, 100), ByteOffset::ZERO));
    assert!(window.would_overflow(&packet(500, 100), ByteOffset::ZERO));
}

#[rstest]
fn packet_covering_expected_is_admitted_into_full_window(mut window: ReorderWindow) {
    let now = Instant::now();
    for offset in [100, 200, 300, 400] {
        window.admit(packet(offset, 100), ByteOffset::ZERO, now);
    }
    assert_eq!(
        window.admit(packet(0, 100), ByteOffset::ZERO, now),
        Admission::Buffered
    );
    for expected in [0, 100, 200, 300, 400] {
        let taken = window
            .take_next(ByteOffset::new(expected))
            .expect("contiguous packet buffered");
        assert_eq!(taken.offset(), ByteOffset::new(expected));
    }
    assert!(window.is_empty());
}

#[rstest]
fn empty_window_never_reports_a_gap(mut window: ReorderWindow) {
    let now = Instant::now();
    assert!(!window.has_gap_timed_out(now + Duration::from_secs(60)));
    window.admit(packet(0, 100), ByteOffset::ZERO, now);
    assert!(!window.has_gap_timed_out(now + Duration::from_secs(60)));
}

#[rstest]
fn restart_resets_gap_clock(mut window: ReorderWindow) {
    let start = Instant::now();
    window.admit(packet(512, 100), ByteOffset::ZERO, start);
    let later = start + Duration::from_millis(40);
    window.restart_gap_clock(later);
    assert!(!window.has_gap_timed_out(start + Duration::from_millis(60)));
    assert!(window.has_gap_timed_out(later + Duration::from_millis(50)));
}

#[rstest]
fn discard_below_keeps_packets_crossing_boundary(mut window: ReorderWindow) {
    let now = Instant::now();
    for offset in [100, 900, 1000] {
        window.admit(packet(offset, 100), ByteOffset::ZERO, now);
    }
    assert_eq!(window.discard_below(ByteOffset::new(1024)), 2);
    assert_eq!(window.lowest_offset(), Some(ByteOffset::new(1000)));
}

#[rstest]
fn prune_stale_drops_leading_consumed_packets(mut window: ReorderWindow) {
    let now = Instant::now();
    for offset in [100, 200, 600] {
        window.admit(packet(offset, 100), ByteOffset::ZERO, now);
    }
    assert_eq!(window.prune_stale(ByteOffset::new(300)), 2);
    assert_eq!(window.len(), 1);
}

#[rstest]
fn clear_drops_everything(mut window: ReorderWindow) {
    let now = Instant::now();
    window.admit(packet(100, 100), ByteOffset::ZERO, now);
    window.admit(packet(300, 100), ByteOffset::ZERO, now);
    assert_eq!(window.clear(), 2);
    assert!(window.is_empty());
    assert!(window.gap_age(now).is_none());
}
