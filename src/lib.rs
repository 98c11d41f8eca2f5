#![doc(html_root_url = "https://docs.rs/adcframe/latest")]
//! Public API for the `adcframe` library.
//!
//! This crate reassembles fixed-length radar ADC frames from the unordered,
//! lossy UDP packet stream of a DCA1000-class capture board. Packets are
//! decoded, reordered within a bounded window, cut into frames at byte
//! boundaries and handed to a consumer through a bounded sink. Frames that
//! cannot be completed are discarded and counted, never delivered.

pub mod assembler;
pub mod error;
pub mod metrics;
pub mod packet;
pub mod reorder;
pub mod sensor;
pub mod session;
pub mod sink;
pub mod source;

pub use assembler::{AssembledFrame, FrameAssembler, FrameIndex};
pub use error::{CaptureError, Result};
pub use packet::{ByteOffset, Packet, SequenceNumber};
pub use session::{CaptureSession, SessionConfig, SessionStats, SessionSummary};
pub use sink::{FrameReceiver, FrameSink, SinkPolicy};
pub use source::{PacketSource, UdpPacketSource};
