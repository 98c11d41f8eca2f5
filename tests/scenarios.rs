#![cfg(not(loom))]
//! Reference scenarios for a 1024-byte frame split into 512, 256 and 256
//! byte packets, driven through the assembler and through a live session.

use std::{
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use adcframe::{
    AssembledFrame,
    CaptureSession,
    FrameAssembler,
    SessionConfig,
    reorder::ReorderConfig,
    session::StopReason,
};
use adcframe_testing::{CaptureStream, Chunk, ScriptedSource, pattern_frame};
use rstest::{fixture, rstest};

const FRAME_LEN: usize = 1024;
const GAP_TIMEOUT: Duration = Duration::from_millis(50);

/// Frame 0 as three packets, followed by frame 1 as one packet.
#[fixture]
fn chunks() -> Vec<Chunk> {
    CaptureStream::new(0, 2 * FRAME_LEN as u64, 1).chunks_sized(&[512, 256, 256, 1024])
}

fn assembler() -> FrameAssembler {
    FrameAssembler::new(
        NonZeroUsize::new(FRAME_LEN).expect("non-zero"),
        ReorderConfig::new(NonZeroUsize::new(2).expect("non-zero"), GAP_TIMEOUT),
    )
}

fn run(asm: &mut FrameAssembler, order: &[&Chunk], now: Instant) -> Vec<AssembledFrame> {
    let mut out = Vec::new();
    for chunk in order {
        asm.push_at(chunk.to_packet(), now, &mut out)
            .expect("assembler is open");
    }
    out
}

#[rstest]
#[case::in_order([0, 1, 2])]
#[case::reordered([1, 2, 0])]
#[case::reversed([2, 1, 0])]
fn three_packets_make_one_frame(chunks: Vec<Chunk>, #[case] order: [usize; 3]) {
    let mut asm = assembler();
    let order: Vec<&Chunk> = order.iter().map(|&i| &chunks[i]).collect();

    let frames = run(&mut asm, &order, Instant::now());

    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].index().get(), 0);
    assert_eq!(frames[0].bytes().as_ref(), pattern_frame(0, FRAME_LEN).as_slice());
    assert_eq!(asm.buffered_len(), 0);
    assert_eq!(asm.expected_offset().get(), FRAME_LEN as u64);
}

#[rstest]
fn lost_middle_packet_discards_frame_zero(chunks: Vec<Chunk>) {
    let mut asm = assembler();
    let start = Instant::now();

    let before = run(&mut asm, &[&chunks[0], &chunks[2]], start);
    assert!(before.is_empty());
    assert_eq!(asm.buffered_len(), 1);

    let mut resynced = Vec::new();
    assert!(asm.poll_gap_at(start + GAP_TIMEOUT, &mut resynced));
    assert!(resynced.is_empty());
    assert_eq!(asm.expected_offset().get(), FRAME_LEN as u64);
    assert_eq!(asm.stats().frames_discarded, 1);
    assert_eq!(asm.stats().resync_discarded_packets, 1);

    let after = run(&mut asm, &[&chunks[3]], start + GAP_TIMEOUT);
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].index().get(), 1);
    assert_eq!(after[0].bytes().as_ref(), pattern_frame(1, FRAME_LEN).as_slice());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn lost_middle_packet_through_a_session(chunks: Vec<Chunk>) {
    let config = SessionConfig::builder(FRAME_LEN)
        .gap_timeout(GAP_TIMEOUT)
        .build()
        .expect("valid config");
    let (source, feed) = ScriptedSource::new();
    let (session, mut frames) = CaptureSession::start(config, source).expect("start session");

    assert!(feed.chunks([&chunks[0], &chunks[2]]));
    tokio::time::sleep(GAP_TIMEOUT * 2).await;
    assert!(feed.chunks([&chunks[3]]));

    let frame = frames.recv().await.expect("frame 1 delivered");
    assert_eq!(frame.index().get(), 1);
    assert_eq!(frame.bytes().as_ref(), pattern_frame(1, FRAME_LEN).as_slice());
    assert!(frames.try_recv().is_none());

    session.stop();
    let summary = session.wait().await.expect("clean stop");
    assert_eq!(summary.reason, StopReason::Requested);
    assert_eq!(summary.stats.dropped_frames(), 1);
    assert_eq!(summary.stats.frames_delivered(), 1);
}
