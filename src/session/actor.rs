//! Ingestion task driving one capture session.
//!
//! The actor owns the source, decoder and assembler, so the hot path takes
//! no locks. A `tokio::select!` loop waits on the shutdown token, the next
//! datagram and a gap poll tick. The `biased` keyword makes a stop request
//! win over pending datagrams.

use std::{io, sync::Arc, time::Duration};

use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{
    SessionConfig,
    StopReason,
    counters::{ActiveSession, SessionCounters},
};
use crate::{
    assembler::{AssembledFrame, FrameAssembler},
    error::CaptureError,
    metrics,
    packet::{MAX_DATAGRAM_LEN, PacketDecoder},
    sink::{FrameSink, SinkError},
    source::PacketSource,
};

enum Event {
    Shutdown,
    Datagram(io::Result<Option<usize>>),
    Tick,
}

pub(super) struct IngestActor<S> {
    source: S,
    decoder: PacketDecoder,
    assembler: FrameAssembler,
    sink: FrameSink,
    counters: Arc<SessionCounters>,
    shutdown: CancellationToken,
    gap_poll_interval: Duration,
    buf: Box<[u8]>,
    frames: Vec<AssembledFrame>,
}

impl<S: PacketSource> IngestActor<S> {
    pub(super) fn new(
        config: &SessionConfig,
        source: S,
        sink: FrameSink,
        counters: Arc<SessionCounters>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            source,
            decoder: PacketDecoder::new(config.offset_mode()),
            assembler: FrameAssembler::new(config.frame_len(), config.reorder()),
            sink,
            counters,
            shutdown,
            gap_poll_interval: config.gap_poll_interval(),
            buf: vec![0; MAX_DATAGRAM_LEN].into_boxed_slice(),
            frames: Vec::new(),
        }
    }

    /// Run until stopped, the receiver goes away or the source fails.
    ///
    /// The partial frame is discarded and the sink producer dropped on every
    /// exit path, so the receiver drains what was queued and then ends.
    pub(super) async fn run(mut self) -> Result<StopReason, CaptureError> {
        let _active = ActiveSession::new();
        let mut ticker = interval(self.gap_poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let outcome = loop {
            let event = tokio::select! {
                biased;

                () = self.shutdown.cancelled() => Event::Shutdown,
                res = self.source.recv(&mut self.buf) => Event::Datagram(res),
                _ = ticker.tick() => Event::Tick,
            };

            match event {
                Event::Shutdown => break Ok(StopReason::Requested),
                Event::Datagram(Ok(Some(len))) => self.ingest(len),
                Event::Datagram(Ok(None)) => break Err(CaptureError::SourceClosed),
                Event::Datagram(Err(error)) => break Err(CaptureError::Source(error)),
                Event::Tick if self.sink.is_closed() => break Ok(StopReason::ReceiverClosed),
                Event::Tick => {
                    self.assembler
                        .poll_gap_at(Instant::now().into_std(), &mut self.frames);
                }
            }

            let delivered = self.deliver().await;
            self.counters.publish(&self.assembler.stats());
            if delivered.is_err() {
                break Ok(StopReason::ReceiverClosed);
            }
        };

        self.assembler.stop();
        self.counters.publish(&self.assembler.stats());
        match &outcome {
            Ok(reason) => info!(?reason, stats = ?self.assembler.stats(), "capture session stopped"),
            Err(error) => warn!(%error, stats = ?self.assembler.stats(), "capture session failed"),
        }
        outcome
    }

    fn ingest(&mut self, len: usize) {
        self.counters.record_datagram();
        let datagram = &self.buf[..len];
        let packet = match self.decoder.decode(datagram) {
            Ok(packet) => packet,
            Err(error) => {
                self.counters.record_malformed();
                metrics::inc_packets_dropped(error.reason());
                debug!(%error, len, "malformed datagram dropped");
                return;
            }
        };
        let now = Instant::now().into_std();
        if let Err(error) = self.assembler.push_at(packet, now, &mut self.frames) {
            debug!(%error, "packet arrived after the assembler stopped");
        }
    }

    async fn deliver(&mut self) -> Result<(), SinkError> {
        for frame in self.frames.drain(..) {
            self.sink.push(frame).await?;
        }
        Ok(())
    }
}
