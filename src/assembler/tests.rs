//! Tests for frame assembly, boundary splitting and gap recovery.

use std::{
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use rstest::rstest;

use super::{AssembledFrame, AssemblerState, AssemblyError, FrameAssembler, FrameIndex};
use crate::{
    packet::{ByteOffset, Packet, SequenceNumber},
    reorder::ReorderConfig,
};

const GAP_TIMEOUT: Duration = Duration::from_millis(40);

/// Deterministic stream content so misplaced bytes are detectable.
fn stream_byte(offset: u64) -> u8 { (offset % 251) as u8 }

fn stream_bytes(start: u64, end: u64) -> Vec<u8> { (start..end).map(stream_byte).collect() }

fn packet(offset: u64, len: u64) -> Packet {
    Packet::new(
        SequenceNumber::new(0),
        ByteOffset::new(offset),
        stream_bytes(offset, offset + len),
    )
    .expect("valid packet")
}

fn assembler(frame_len: usize, capacity: usize) -> FrameAssembler {
    FrameAssembler::new(
        NonZeroUsize::new(frame_len).expect("non-zero"),
        ReorderConfig::new(NonZeroUsize::new(capacity).expect("non-zero"), GAP_TIMEOUT),
    )
}

fn push_all(
    assembler: &mut FrameAssembler,
    packets: impl IntoIterator<Item = Packet>,
    now: Instant,
) -> Vec<AssembledFrame> {
    let mut out = Vec::new();
    for packet in packets {
        assembler
            .push_at(packet, now, &mut out)
            .expect("assembler accepts packets");
    }
    out
}

fn indices(frames: &[AssembledFrame]) -> Vec<u64> {
    frames.iter().map(|frame| frame.index().get()).collect()
}

#[test]
fn in_order_packets_build_one_frame() {
    let mut assembler = assembler(1024, 8);
    let frames = push_all(
        &mut assembler,
        [packet(0, 512), packet(512, 256), packet(768, 256)],
        Instant::now(),
    );

    assert_eq!(indices(&frames), [0]);
    assert_eq!(frames[0].bytes().as_ref(), stream_bytes(0, 1024).as_slice());
    assert!(frames[0].is_complete());
    assert_eq!(assembler.expected_offset(), ByteOffset::new(1024));
    assert_eq!(assembler.current_frame_index(), FrameIndex::new(1));
}

#[test]
fn reordered_packets_are_buffered_until_offset_zero_arrives() {
    let mut assembler = assembler(1024, 8);
    let now = Instant::now();
    let mut out = Vec::new();

    assembler
        .push_at(packet(768, 256), now, &mut out)
        .expect("push");
    assembler
        .push_at(packet(512, 256), now, &mut out)
        .expect("push");
    assert!(out.is_empty());
    assert_eq!(assembler.buffered_len(), 2);
    assert_eq!(assembler.state(), AssemblerState::AwaitingFirstPacket);

    assembler.push_at(packet(0, 512), now, &mut out).expect("push");
    assert_eq!(indices(&out), [0]);
    assert_eq!(out[0].bytes().as_ref(), stream_bytes(0, 1024).as_slice());
    assert_eq!(assembler.buffered_len(), 0);
}

#[test]
fn lost_packet_discards_frame_and_resyncs_at_next_boundary() {
    let mut assembler = assembler(1024, 8);
    let start = Instant::now();
    let mut out = Vec::new();

    assembler.push_at(packet(0, 512), start, &mut out).expect("push");
    assembler
        .push_at(packet(768, 256), start, &mut out)
        .expect("push");
    assert!(!assembler.poll_gap_at(start + GAP_TIMEOUT / 2, &mut out));

    assert!(assembler.poll_gap_at(start + GAP_TIMEOUT, &mut out));
    assert!(out.is_empty(), "incomplete frame must not be delivered");
    assert_eq!(
        assembler.state(),
        AssemblerState::Resyncing {
            boundary: ByteOffset::new(1024)
        }
    );
    assert_eq!(assembler.expected_offset(), ByteOffset::new(1024));

    let later = start + GAP_TIMEOUT * 2;
    assembler
        .push_at(packet(1024, 1024), later, &mut out)
        .expect("push");
    assert_eq!(indices(&out), [1]);
    assert_eq!(out[0].bytes().as_ref(), stream_bytes(1024, 2048).as_slice());

    let stats = assembler.stats();
    assert_eq!(stats.frames_discarded, 1);
    assert_eq!(stats.resyncs, 1);
    assert_eq!(stats.resync_discarded_packets, 1);
}

#[test]
fn straddling_packet_completes_one_frame_and_seeds_the_next() {
    let mut assembler = assembler(1024, 8);
    let now = Instant::now();
    let mut out = Vec::new();

    assembler.push_at(packet(0, 1000), now, &mut out).expect("push");
    assembler
        .push_at(packet(1000, 100), now, &mut out)
        .expect("push");
    assert_eq!(indices(&out), [0]);
    assert_eq!(out[0].bytes().as_ref(), stream_bytes(0, 1024).as_slice());
    assert_eq!(assembler.expected_offset(), ByteOffset::new(1100));
    assert_eq!(assembler.current_frame_index(), FrameIndex::new(1));

    assembler
        .push_at(packet(1100, 948), now, &mut out)
        .expect("push");
    assert_eq!(indices(&out), [0, 1]);
    assert_eq!(out[1].bytes().as_ref(), stream_bytes(1024, 2048).as_slice());
}

#[test]
fn single_packet_may_span_several_frames() {
    let mut assembler = assembler(100, 4);
    let frames = push_all(&mut assembler, [packet(0, 350)], Instant::now());
    assert_eq!(indices(&frames), [0, 1, 2]);
    assert_eq!(assembler.expected_offset(), ByteOffset::new(350));
    assert_eq!(frames[2].bytes().as_ref(), stream_bytes(200, 300).as_slice());
}

#[test]
fn duplicates_contribute_once() {
    let mut assembler = assembler(1024, 8);
    let frames = push_all(
        &mut assembler,
        [
            packet(512, 512),
            packet(512, 512),
            packet(0, 512),
            packet(0, 512),
            packet(512, 512),
        ],
        Instant::now(),
    );
    assert_eq!(indices(&frames), [0]);
    assert_eq!(frames[0].bytes().as_ref(), stream_bytes(0, 1024).as_slice());

    let stats = assembler.stats();
    assert_eq!(stats.duplicate_packets, 1);
    assert_eq!(stats.stale_packets, 2);
    assert_eq!(stats.dropped_packets(), 3);
}

#[test]
fn overlapping_packet_is_trimmed_to_unseen_bytes() {
    let mut assembler = assembler(100, 4);
    let frames = push_all(
        &mut assembler,
        [packet(0, 60), packet(40, 60)],
        Instant::now(),
    );
    assert_eq!(indices(&frames), [0]);
    assert_eq!(frames[0].bytes().as_ref(), stream_bytes(0, 100).as_slice());
}

#[test]
fn loss_spanning_frames_jumps_to_first_fillable_boundary() {
    let mut assembler = assembler(100, 8);
    let start = Instant::now();
    let mut out = push_all(
        &mut assembler,
        [packet(0, 100), packet(350, 50), packet(400, 100), packet(500, 100)],
        start,
    );
    assert_eq!(indices(&out), [0]);

    assert!(assembler.poll_gap_at(start + GAP_TIMEOUT, &mut out));
    assert_eq!(indices(&out), [0, 4, 5]);
    assert_eq!(assembler.stats().frames_discarded, 3);
    assert_eq!(assembler.current_frame_index(), FrameIndex::new(6));
}

#[test]
fn straddling_packet_seeds_frame_after_resync() {
    let mut assembler = assembler(1024, 8);
    let start = Instant::now();
    let mut out = push_all(
        &mut assembler,
        [packet(0, 1456), packet(2912, 1456)],
        start,
    );
    assert_eq!(indices(&out), [0]);

    assert!(assembler.poll_gap_at(start + GAP_TIMEOUT, &mut out));
    assert_eq!(indices(&out), [0, 3]);
    assert_eq!(out[1].bytes().as_ref(), stream_bytes(3072, 4096).as_slice());
    assert_eq!(assembler.stats().frames_discarded, 2);
    assert_eq!(assembler.expected_offset(), ByteOffset::new(4368));
}

#[test]
fn reordering_as_deep_as_the_window_loses_nothing() {
    let mut assembler = assembler(1024, 2);
    let frames = push_all(
        &mut assembler,
        [packet(768, 256), packet(512, 256), packet(0, 512)],
        Instant::now(),
    );

    assert_eq!(indices(&frames), [0]);
    assert_eq!(frames[0].bytes().as_ref(), stream_bytes(0, 1024).as_slice());
    let stats = assembler.stats();
    assert_eq!(stats.frames_discarded, 0);
    assert_eq!(stats.resyncs, 0);
    assert_eq!(stats.evicted_packets, 0);
}

#[test]
fn full_window_waits_for_the_gap() {
    let mut assembler = assembler(100, 3);
    let now = Instant::now();
    let mut out = push_all(
        &mut assembler,
        [
            packet(0, 50),
            packet(100, 50),
            packet(150, 50),
            packet(200, 50),
        ],
        now,
    );
    assert!(out.is_empty());
    assert_eq!(assembler.buffered_len(), 3);
    assert!(!assembler.poll_gap_at(now, &mut out));

    assembler.push_at(packet(50, 50), now, &mut out).expect("push");
    assert_eq!(indices(&out), [0, 1]);
    assert_eq!(assembler.stats().frames_discarded, 0);
}

#[test]
fn overflowing_window_forces_resync_without_waiting() {
    let mut assembler = assembler(100, 3);
    let now = Instant::now();
    let out = push_all(
        &mut assembler,
        [
            packet(0, 50),
            packet(100, 50),
            packet(150, 50),
            packet(200, 50),
            packet(250, 50),
        ],
        now,
    );

    assert_eq!(indices(&out), [1, 2]);
    assert_eq!(out[1].bytes().as_ref(), stream_bytes(200, 300).as_slice());
    let stats = assembler.stats();
    assert_eq!(stats.frames_discarded, 1);
    assert_eq!(stats.resyncs, 1);
    assert_eq!(stats.evicted_packets, 0);
    assert_eq!(assembler.expected_offset(), ByteOffset::new(300));
}

#[test]
fn unobserved_stream_start_attaches_at_next_boundary() {
    let mut assembler = assembler(1000, 8);
    let start = Instant::now();
    let mut out = push_all(
        &mut assembler,
        [packet(1500, 500), packet(2000, 1000)],
        start,
    );
    assert!(out.is_empty());

    assert!(assembler.poll_gap_at(start + GAP_TIMEOUT, &mut out));
    assert_eq!(indices(&out), [2]);
    assert_eq!(out[0].bytes().as_ref(), stream_bytes(2000, 3000).as_slice());
    let stats = assembler.stats();
    assert_eq!(stats.frames_discarded, 2);
    assert_eq!(stats.resyncs, 1);
    assert_eq!(stats.resync_discarded_packets, 1);
}

#[test]
fn late_stream_start_counts_skipped_frames() {
    let mut assembler = assembler(1000, 2);
    let out = push_all(
        &mut assembler,
        [
            packet(1000, 1000),
            packet(2000, 1000),
            packet(3000, 1000),
            packet(0, 1000),
        ],
        Instant::now(),
    );

    assert_eq!(indices(&out), [1, 2, 3]);
    let stats = assembler.stats();
    assert_eq!(stats.frames_discarded, 1);
    assert_eq!(stats.resyncs, 1);
    assert_eq!(stats.stale_packets, 1);
}

#[test]
fn aligned_mid_stream_start_is_authoritative() {
    let mut assembler = assembler(1000, 1);
    let out = push_all(
        &mut assembler,
        [packet(5000, 500), packet(5500, 500)],
        Instant::now(),
    );
    assert_eq!(indices(&out), [5]);
    assert_eq!(assembler.stats().frames_discarded, 5);
    assert_eq!(assembler.stats().resyncs, 1);
}

#[rstest]
#[case::before_any_packet(Vec::new())]
#[case::mid_frame(vec![packet(0, 300)])]
#[case::with_buffered_packets(vec![packet(0, 300), packet(600, 100)])]
fn stop_is_idempotent_and_discards_partial_frame(#[case] packets: Vec<Packet>) {
    let mut assembler = assembler(1024, 8);
    let out = push_all(&mut assembler, packets, Instant::now());
    assert!(out.is_empty());

    assembler.stop();
    assembler.stop();
    assert_eq!(assembler.state(), AssemblerState::Closed);
    assert_eq!(assembler.buffered_len(), 0);

    let mut out = Vec::new();
    assert_eq!(
        assembler.push_at(packet(300, 724), Instant::now(), &mut out),
        Err(AssemblyError::Closed)
    );
    assert!(!assembler.poll_gap_at(Instant::now() + GAP_TIMEOUT, &mut out));
    assert!(out.is_empty());
}

#[test]
fn expected_offset_never_regresses() {
    let mut assembler = assembler(64, 4);
    let start = Instant::now();
    let mut out = Vec::new();
    let mut last = assembler.expected_offset();
    let script = [
        (0, 32),
        (96, 32),
        (32, 16),
        (200, 40),
        (240, 16),
        (16, 64),
        (256, 64),
    ];
    for (step, (offset, len)) in script.into_iter().enumerate() {
        let now = start + GAP_TIMEOUT * u32::try_from(step).expect("small step");
        assembler
            .push_at(packet(offset, len), now, &mut out)
            .expect("push");
        assembler.poll_gap_at(now, &mut out);
        assert!(assembler.expected_offset() >= last);
        last = assembler.expected_offset();
    }
    for frame in &out {
        let start = frame.index().get() * 64;
        assert_eq!(frame.bytes().as_ref(), stream_bytes(start, start + 64).as_slice());
    }
    let emitted = indices(&out);
    assert!(emitted.windows(2).all(|pair| pair[0] < pair[1]));
}
