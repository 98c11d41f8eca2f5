//! Bounded hand-off of assembled frames to a consumer.
//!
//! The ingestion task pushes frames through a [`FrameSink`]; the consumer
//! drains them from the paired [`FrameReceiver`]. The queue is bounded and a
//! [`SinkPolicy`] decides what happens when it is full, so a slow consumer
//! costs frames rather than memory. Frames keep FIFO order and each frame is
//! delivered at most once.

#[cfg(not(loom))]
use std::sync::{Mutex, atomic::AtomicU64};
use std::{
    collections::VecDeque,
    sync::{Arc, PoisonError, atomic::Ordering},
    time::Duration,
};

use futures::Stream;
#[cfg(loom)]
use loom::sync::Mutex;
#[cfg(loom)]
use loom::sync::atomic::AtomicU64;
use static_assertions::const_assert;
use tokio::sync::Notify;
use tracing::warn;

use crate::{
    assembler::{AssembledFrame, FrameIndex},
    metrics,
};

mod builder;
mod errors;
mod handle;

pub use builder::FrameSinkBuilder;
pub use errors::{SinkConfigError, SinkError};
pub use handle::{FrameSink, SinkProbe};

/// Number of frames held when no capacity is configured.
pub const DEFAULT_SINK_CAPACITY: usize = 8;
/// Largest supported capacity for [`FrameSinkBuilder::capacity`].
pub const MAX_SINK_CAPACITY: usize = 4096;

const_assert!(DEFAULT_SINK_CAPACITY <= MAX_SINK_CAPACITY);

/// Behaviour when the sink is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SinkPolicy {
    /// Remove the oldest queued frame to make room. Pushes never wait.
    #[default]
    DropOldest,
    /// Discard the frame being pushed.
    DropNewest,
    /// Wait up to the given duration for room, then discard the frame being
    /// pushed.
    BlockWithTimeout(Duration),
}

/// What happened to a pushed frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    /// The frame was queued without displacing anything.
    Queued,
    /// The frame was queued after the oldest frame, with this index, was
    /// dropped.
    DroppedOldest(FrameIndex),
    /// The pushed frame, with this index, was dropped.
    DroppedNewest(FrameIndex),
}

impl PushOutcome {
    /// Report whether some frame was lost to make this push complete.
    #[must_use]
    pub const fn is_drop(self) -> bool { !matches!(self, Self::Queued) }
}

struct State {
    frames: VecDeque<AssembledFrame>,
    producers: usize,
    receiver_open: bool,
}

/// State shared by producers, the receiver and probes.
pub(crate) struct Shared {
    state: Mutex<State>,
    capacity: usize,
    policy: SinkPolicy,
    dropped: AtomicU64,
    frame_ready: Notify,
    space_ready: Notify,
}

enum Dequeue {
    Frame(AssembledFrame),
    Empty,
    Finished,
}

impl Shared {
    fn new(capacity: usize, policy: SinkPolicy) -> Self {
        Self {
            state: Mutex::new(State {
                frames: VecDeque::with_capacity(capacity),
                producers: 1,
                receiver_open: true,
            }),
            capacity,
            policy,
            dropped: AtomicU64::new(0),
            frame_ready: Notify::new(),
            space_ready: Notify::new(),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Queue `frame` if there is room, handing it back otherwise.
    fn try_enqueue(
        &self,
        frame: AssembledFrame,
    ) -> Result<Result<(), AssembledFrame>, SinkError> {
        let queued = self.with_state(|state| {
            if !state.receiver_open {
                return Err(SinkError::Closed);
            }
            if state.frames.len() >= self.capacity {
                return Ok(Err(frame));
            }
            state.frames.push_back(frame);
            Ok(Ok(()))
        })?;
        if queued.is_ok() {
            self.frame_ready.notify_one();
        }
        Ok(queued)
    }

    /// Queue `frame`, removing and returning the oldest frame when full.
    fn enqueue_displacing(
        &self,
        frame: AssembledFrame,
    ) -> Result<Option<AssembledFrame>, SinkError> {
        let displaced = self.with_state(|state| {
            if !state.receiver_open {
                return Err(SinkError::Closed);
            }
            let displaced = if state.frames.len() >= self.capacity {
                state.frames.pop_front()
            } else {
                None
            };
            state.frames.push_back(frame);
            Ok(displaced)
        })?;
        self.frame_ready.notify_one();
        Ok(displaced)
    }

    fn record_drop(&self, index: FrameIndex) {
        let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        metrics::inc_frames(metrics::FrameOutcome::SinkDropped);
        warn!(
            frame = %index,
            policy = ?self.policy,
            dropped = total,
            "frame sink full; dropped frame"
        );
    }

    fn dequeue(&self) -> Dequeue {
        let next = self.with_state(|state| match state.frames.pop_front() {
            Some(frame) => Dequeue::Frame(frame),
            None if state.producers == 0 || !state.receiver_open => Dequeue::Finished,
            None => Dequeue::Empty,
        });
        if matches!(next, Dequeue::Frame(_)) {
            self.space_ready.notify_one();
        }
        next
    }

    fn close_receiver(&self) {
        self.with_state(|state| state.receiver_open = false);
        self.space_ready.notify_waiters();
    }

    fn is_receiver_open(&self) -> bool { self.with_state(|state| state.receiver_open) }

    fn len(&self) -> usize { self.with_state(|state| state.frames.len()) }

    fn dropped_count(&self) -> u64 { self.dropped.load(Ordering::Relaxed) }
}

/// Consumer end of a frame sink.
///
/// Dropping the receiver closes the sink; later pushes fail with
/// [`SinkError::Closed`].
pub struct FrameReceiver {
    shared: Arc<Shared>,
}

impl FrameReceiver {
    /// Receive the next frame in FIFO order.
    ///
    /// Returns `None` once every producer is gone, or the receiver was
    /// closed, and the queue has been drained.
    pub async fn recv(&mut self) -> Option<AssembledFrame> {
        loop {
            let ready = self.shared.frame_ready.notified();
            tokio::pin!(ready);
            ready.as_mut().enable();
            match self.shared.dequeue() {
                Dequeue::Frame(frame) => return Some(frame),
                Dequeue::Finished => return None,
                Dequeue::Empty => ready.await,
            }
        }
    }

    /// Take the next frame if one is queued, without waiting.
    pub fn try_recv(&mut self) -> Option<AssembledFrame> {
        match self.shared.dequeue() {
            Dequeue::Frame(frame) => Some(frame),
            Dequeue::Empty | Dequeue::Finished => None,
        }
    }

    /// Convert the receiver into a stream of frames.
    pub fn into_stream(self) -> impl Stream<Item = AssembledFrame> + Send {
        futures::stream::unfold(self, |mut receiver| async move {
            receiver.recv().await.map(|frame| (frame, receiver))
        })
    }

    /// Refuse further pushes. Frames already queued can still be received.
    pub fn close(&mut self) { self.shared.close_receiver(); }

    /// Number of frames currently queued.
    #[must_use]
    pub fn len(&self) -> usize { self.shared.len() }

    /// Report whether no frames are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Frames dropped by the sink policy so far.
    #[must_use]
    pub fn dropped_count(&self) -> u64 { self.shared.dropped_count() }
}

impl Drop for FrameReceiver {
    fn drop(&mut self) { self.shared.close_receiver(); }
}

impl std::fmt::Debug for FrameReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameReceiver")
            .field("len", &self.len())
            .field("dropped", &self.dropped_count())
            .finish_non_exhaustive()
    }
}
