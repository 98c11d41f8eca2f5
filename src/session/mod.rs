//! Capture session lifecycle.
//!
//! [`CaptureSession::start`] wires a [`PacketSource`] to a frame assembler
//! and a bounded sink, then runs ingestion on a Tokio task. The returned
//! handle stops the task, reports counters while it runs and joins it.

mod actor;
mod config;
mod counters;

use std::sync::Arc;

use actor::IngestActor;
pub use config::{
    DEFAULT_GAP_TIMEOUT,
    DEFAULT_REORDER_CAPACITY,
    MAX_REORDER_CAPACITY,
    SessionConfig,
    SessionConfigBuilder,
    SessionConfigError,
};
use counters::SessionCounters;
pub use counters::{SessionStats, active_session_count};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    error::Result,
    sink::{FrameReceiver, FrameSink, SinkProbe},
    source::PacketSource,
};

/// Why a session ended without error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// [`CaptureSession::stop`] was called or the session handle dropped.
    Requested,
    /// The [`FrameReceiver`] was closed or dropped.
    ReceiverClosed,
}

/// Final report returned by [`CaptureSession::wait`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    /// Why ingestion ended.
    pub reason: StopReason,
    /// Counters at the moment ingestion ended.
    pub stats: SessionStats,
}

/// Handle to a running capture session.
///
/// Dropping the handle stops the session.
///
/// # Examples
///
/// ```no_run
/// use adcframe::{
///     session::{CaptureSession, SessionConfig},
///     source::UdpPacketSource,
/// };
///
/// # async fn demo() -> adcframe::Result<()> {
/// let config = SessionConfig::builder(196_608).build()?;
/// let source = UdpPacketSource::bind("0.0.0.0:4098").await?;
/// let (session, mut frames) = CaptureSession::start(config, source)?;
/// while let Some(frame) = frames.recv().await {
///     println!("frame {} ({} bytes)", frame.index(), frame.len());
/// }
/// session.stop();
/// let summary = session.wait().await?;
/// println!("dropped {} frames", summary.stats.dropped_frames());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CaptureSession {
    shutdown: CancellationToken,
    counters: Arc<SessionCounters>,
    sink: SinkProbe,
    task: Option<JoinHandle<Result<StopReason>>>,
}

impl CaptureSession {
    /// Validate `config`, build the sink and spawn the ingestion task.
    ///
    /// Must be called within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SessionConfigError::Sink`] if the sink cannot be built.
    pub fn start<S>(
        config: SessionConfig,
        source: S,
    ) -> std::result::Result<(Self, FrameReceiver), SessionConfigError>
    where
        S: PacketSource + 'static,
    {
        let (sink, receiver) = FrameSink::builder()
            .capacity(config.sink_capacity())
            .policy(config.sink_policy())
            .build()?;
        let shutdown = CancellationToken::new();
        let counters = Arc::new(SessionCounters::default());
        let probe = sink.probe();

        info!(
            frame_len = config.frame_len().get(),
            reorder_capacity = config.reorder().capacity.get(),
            gap_timeout = ?config.reorder().gap_timeout,
            sink_capacity = config.sink_capacity(),
            sink_policy = ?config.sink_policy(),
            "capture session started"
        );
        let actor = IngestActor::new(
            &config,
            source,
            sink,
            Arc::clone(&counters),
            shutdown.clone(),
        );
        let task = tokio::spawn(actor.run());

        Ok((
            Self {
                shutdown,
                counters,
                sink: probe,
                task: Some(task),
            },
            receiver,
        ))
    }

    /// Request the session to stop.
    ///
    /// Safe to call repeatedly, before any packet arrived and after the
    /// session already ended. The partial frame is discarded.
    pub fn stop(&self) { self.shutdown.cancel(); }

    /// Wait for the ingestion task to finish.
    ///
    /// Does not request a stop; call [`CaptureSession::stop`] first to end a
    /// session that is still receiving.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Source`](crate::CaptureError::Source) or
    /// [`CaptureError::SourceClosed`](crate::CaptureError::SourceClosed) if
    /// the source failed, and [`CaptureError::Task`](crate::CaptureError::Task)
    /// if the task panicked.
    pub async fn wait(mut self) -> Result<SessionSummary> {
        let reason = match self.task.take() {
            Some(task) => task.await??,
            None => StopReason::Requested,
        };
        Ok(SessionSummary {
            reason,
            stats: self.stats(),
        })
    }

    /// Report whether the ingestion task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Frames lost to gaps or to a full sink so far.
    #[must_use]
    pub fn dropped_frame_count(&self) -> u64 { self.stats().dropped_frames() }

    /// Datagrams that contributed nothing to an emitted frame so far.
    #[must_use]
    pub fn dropped_packet_count(&self) -> u64 { self.stats().dropped_packets() }

    /// Snapshot of every session counter.
    #[must_use]
    pub fn stats(&self) -> SessionStats { self.counters.snapshot(self.sink.dropped_count()) }

    /// Token cancelled when the session is asked to stop.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken { self.shutdown.clone() }
}

impl Drop for CaptureSession {
    fn drop(&mut self) { self.shutdown.cancel(); }
}
