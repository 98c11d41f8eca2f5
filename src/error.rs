//! Crate-level error and result types.
//!
//! Per-packet and per-frame problems never surface here: they are counted
//! and logged where they occur. `CaptureError` covers what ends a session
//! or prevents one from starting.

use std::io;

use thiserror::Error;

use crate::{sensor::SensorConfigError, session::SessionConfigError};

/// Errors that stop or prevent a capture session.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The packet source reported an I/O failure.
    #[error("packet source failed: {0}")]
    Source(#[from] io::Error),
    /// The packet source was closed while the session was running.
    #[error("packet source closed")]
    SourceClosed,
    /// The session configuration was rejected.
    #[error("invalid session configuration: {0}")]
    Config(#[from] SessionConfigError),
    /// The sensor profile could not be turned into a frame geometry.
    #[error("invalid sensor configuration: {0}")]
    Sensor(#[from] SensorConfigError),
    /// The ingestion task panicked or was aborted.
    #[error("ingestion task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type used throughout the crate.
pub type Result<T, E = CaptureError> = std::result::Result<T, E>;
