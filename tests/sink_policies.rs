#![cfg(not(loom))]
//! Tests for frame sink back-pressure policies and their log output.

use std::time::Duration;

use adcframe::{
    AssembledFrame,
    FrameIndex,
    sink::{FrameSink, FrameSinkBuilder, PushOutcome, SinkPolicy},
};
use adcframe_testing::{LoggerHandle, logger};
use rstest::{fixture, rstest};
use serial_test::serial;
use tokio::runtime::Runtime;

/// Builds a single-thread [`Runtime`] for async tests.
#[fixture]
fn rt() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .expect("failed to build test runtime")
}

#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
fn builder() -> FrameSinkBuilder { FrameSink::builder().capacity(1) }

fn frame(index: u64) -> AssembledFrame { AssembledFrame::new(FrameIndex::new(index), vec![0_u8; 4]) }

#[derive(Clone, Copy, Debug)]
struct PolicyCase {
    policy: SinkPolicy,
    outcome: PushOutcome,
    kept: u64,
}

/// Verifies which frame survives a full sink and that the drop is logged.
#[rstest]
#[case::drop_oldest(PolicyCase {
    policy: SinkPolicy::DropOldest,
    outcome: PushOutcome::DroppedOldest(FrameIndex::new(1)),
    kept: 2,
})]
#[case::drop_newest(PolicyCase {
    policy: SinkPolicy::DropNewest,
    outcome: PushOutcome::DroppedNewest(FrameIndex::new(2)),
    kept: 1,
})]
#[case::block_expires(PolicyCase {
    policy: SinkPolicy::BlockWithTimeout(Duration::from_millis(10)),
    outcome: PushOutcome::DroppedNewest(FrameIndex::new(2)),
    kept: 1,
})]
#[serial(sink_policies)]
fn full_sink_follows_policy(
    rt: Runtime,
    mut logger: LoggerHandle,
    builder: FrameSinkBuilder,
    #[case] case: PolicyCase,
) {
    rt.block_on(async {
        logger.clear();
        let (sink, mut receiver) = builder.policy(case.policy).build().expect("valid sink");

        assert_eq!(sink.push(frame(1)).await, Ok(PushOutcome::Queued));
        assert_eq!(sink.push(frame(2)).await, Ok(case.outcome));

        let survivor = receiver.recv().await.expect("one frame queued");
        assert_eq!(survivor.index().get(), case.kept);
        assert!(receiver.try_recv().is_none());
        assert_eq!(sink.dropped_count(), 1);
        assert!(
            logger.drain_contains(log::Level::Warn, "frame sink full"),
            "drop warning not logged"
        );
    });
}

#[rstest]
#[serial(sink_policies)]
fn queued_frames_are_not_logged(rt: Runtime, mut logger: LoggerHandle, builder: FrameSinkBuilder) {
    rt.block_on(async {
        logger.clear();
        let (sink, mut receiver) = builder.build().expect("valid sink");
        for index in 0..3 {
            assert_eq!(sink.push(frame(index)).await, Ok(PushOutcome::Queued));
            assert_eq!(receiver.recv().await.map(|f| f.index().get()), Some(index));
        }
        assert!(!logger.drain_contains(log::Level::Warn, "frame sink full"));
    });
}

#[rstest]
fn blocked_push_resumes_when_the_consumer_catches_up(rt: Runtime, builder: FrameSinkBuilder) {
    rt.block_on(async {
        let (sink, mut receiver) = builder
            .policy(SinkPolicy::BlockWithTimeout(Duration::from_secs(5)))
            .build()
            .expect("valid sink");
        sink.push(frame(0)).await.expect("push");

        let producer = tokio::spawn({
            let sink = sink.clone();
            async move { sink.push(frame(1)).await }
        });
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(receiver.recv().await.map(|f| f.index().get()), Some(0));

        let outcome = producer.await.expect("producer task");
        assert_eq!(outcome, Ok(PushOutcome::Queued));
        assert_eq!(receiver.recv().await.map(|f| f.index().get()), Some(1));
        assert_eq!(sink.dropped_count(), 0);
    });
}
