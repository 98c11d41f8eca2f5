//! Producer handle used by the ingestion task to hand off frames.

use std::sync::Arc;

use tokio::time::{Instant, timeout_at};
use tracing::debug;

use super::{
    FrameReceiver,
    FrameSinkBuilder,
    MAX_SINK_CAPACITY,
    PushOutcome,
    Shared,
    SinkConfigError,
    SinkError,
    SinkPolicy,
};
use crate::assembler::AssembledFrame;

/// Producer end of a bounded frame sink.
///
/// Clones share the queue. The sink finishes, and [`FrameReceiver::recv`]
/// returns `None` after draining, once every clone has been dropped.
pub struct FrameSink {
    shared: Arc<Shared>,
}

impl FrameSink {
    /// Start building a new sink.
    #[must_use]
    pub fn builder() -> FrameSinkBuilder { FrameSinkBuilder::default() }

    pub(super) fn build_with(
        capacity: usize,
        policy: SinkPolicy,
    ) -> Result<(Self, FrameReceiver), SinkConfigError> {
        if capacity == 0 || capacity > MAX_SINK_CAPACITY {
            return Err(SinkConfigError::InvalidCapacity(capacity));
        }
        let shared = Arc::new(Shared::new(capacity, policy));
        Ok((
            Self {
                shared: Arc::clone(&shared),
            },
            FrameReceiver { shared },
        ))
    }

    /// Push a frame according to the configured [`SinkPolicy`].
    ///
    /// Only [`SinkPolicy::BlockWithTimeout`] ever waits, and never longer
    /// than its timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Closed`] if the receiver has been closed or
    /// dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use adcframe::{
    ///     assembler::{AssembledFrame, FrameIndex},
    ///     sink::{FrameSink, PushOutcome, SinkPolicy},
    /// };
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let (sink, mut receiver) = FrameSink::builder()
    ///     .capacity(1)
    ///     .policy(SinkPolicy::DropOldest)
    ///     .build()
    ///     .expect("failed to build FrameSink");
    /// sink.push(AssembledFrame::new(FrameIndex::new(0), vec![0_u8; 4]))
    ///     .await
    ///     .expect("push failed");
    /// let outcome = sink
    ///     .push(AssembledFrame::new(FrameIndex::new(1), vec![1_u8; 4]))
    ///     .await
    ///     .expect("push failed");
    /// assert_eq!(outcome, PushOutcome::DroppedOldest(FrameIndex::new(0)));
    /// let frame = receiver.recv().await.expect("frame queued");
    /// assert_eq!(frame.index(), FrameIndex::new(1));
    /// # }
    /// ```
    pub async fn push(&self, frame: AssembledFrame) -> Result<PushOutcome, SinkError> {
        let SinkPolicy::BlockWithTimeout(timeout) = self.shared.policy else {
            return self.try_push(frame);
        };
        let deadline = Instant::now() + timeout;
        let mut frame = frame;
        loop {
            let space = self.shared.space_ready.notified();
            tokio::pin!(space);
            space.as_mut().enable();
            match self.shared.try_enqueue(frame)? {
                Ok(()) => return Ok(PushOutcome::Queued),
                Err(rejected) => frame = rejected,
            }
            if timeout_at(deadline, space).await.is_err() {
                debug!(frame = %frame.index(), ?timeout, "timed out waiting for sink space");
                return Ok(self.reject(&frame));
            }
        }
    }

    /// Push a frame without waiting.
    ///
    /// Under [`SinkPolicy::BlockWithTimeout`] a full sink drops the pushed
    /// frame immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Closed`] if the receiver has been closed or
    /// dropped.
    pub fn try_push(&self, frame: AssembledFrame) -> Result<PushOutcome, SinkError> {
        match self.shared.policy {
            SinkPolicy::DropOldest => match self.shared.enqueue_displacing(frame)? {
                Some(displaced) => {
                    let index = displaced.index();
                    self.shared.record_drop(index);
                    Ok(PushOutcome::DroppedOldest(index))
                }
                None => Ok(PushOutcome::Queued),
            },
            SinkPolicy::DropNewest | SinkPolicy::BlockWithTimeout(_) => {
                match self.shared.try_enqueue(frame)? {
                    Ok(()) => Ok(PushOutcome::Queued),
                    Err(rejected) => Ok(self.reject(&rejected)),
                }
            }
        }
    }

    fn reject(&self, frame: &AssembledFrame) -> PushOutcome {
        let index = frame.index();
        self.shared.record_drop(index);
        PushOutcome::DroppedNewest(index)
    }

    /// Frames dropped by the sink policy so far.
    #[must_use]
    pub fn dropped_count(&self) -> u64 { self.shared.dropped_count() }

    /// Report whether the receiver has gone away.
    #[must_use]
    pub fn is_closed(&self) -> bool { !self.shared.is_receiver_open() }

    /// Maximum number of queued frames.
    #[must_use]
    pub fn capacity(&self) -> usize { self.shared.capacity }

    /// Policy applied when the sink is full.
    #[must_use]
    pub fn policy(&self) -> SinkPolicy { self.shared.policy }

    /// Observe the sink without keeping it open.
    #[must_use]
    pub fn probe(&self) -> SinkProbe {
        SinkProbe {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Clone for FrameSink {
    fn clone(&self) -> Self {
        self.shared.with_state(|state| state.producers += 1);
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Drop for FrameSink {
    fn drop(&mut self) {
        let remaining = self.shared.with_state(|state| {
            state.producers -= 1;
            state.producers
        });
        if remaining == 0 {
            self.shared.frame_ready.notify_one();
        }
    }
}

impl std::fmt::Debug for FrameSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSink")
            .field("capacity", &self.shared.capacity)
            .field("policy", &self.shared.policy)
            .finish_non_exhaustive()
    }
}

/// Read-only view of a sink's counters.
///
/// Holding a probe neither keeps producers alive nor keeps the sink open.
#[derive(Clone)]
pub struct SinkProbe {
    shared: Arc<Shared>,
}

impl SinkProbe {
    /// Frames dropped by the sink policy so far.
    #[must_use]
    pub fn dropped_count(&self) -> u64 { self.shared.dropped_count() }

    /// Number of frames currently queued.
    #[must_use]
    pub fn len(&self) -> usize { self.shared.len() }

    /// Report whether no frames are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl std::fmt::Debug for SinkProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkProbe")
            .field("dropped", &self.dropped_count())
            .finish_non_exhaustive()
    }
}
