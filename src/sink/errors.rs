//! Error types for frame sink operations and configuration.

use thiserror::Error;

use super::MAX_SINK_CAPACITY;

/// Errors that can occur when pushing a frame.
#[non_exhaustive]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// The receiving end has been closed or dropped.
    #[error("frame sink closed")]
    Closed,
}

/// Errors returned when building a frame sink.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkConfigError {
    /// The capacity was zero or exceeded [`MAX_SINK_CAPACITY`].
    #[error("invalid sink capacity {0}; must be between 1 and {max}", max = MAX_SINK_CAPACITY)]
    InvalidCapacity(usize),
}
