//! Builder for configuring frame sinks.

use super::{DEFAULT_SINK_CAPACITY, FrameReceiver, FrameSink, SinkConfigError, SinkPolicy};

/// Builder for a [`FrameSink`] and its paired [`FrameReceiver`].
///
/// Defaults to a capacity of [`DEFAULT_SINK_CAPACITY`] frames and
/// [`SinkPolicy::DropOldest`]. Construct via [`FrameSink::builder`] or
/// [`Default::default`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use adcframe::sink::{FrameSink, SinkPolicy};
///
/// let (_sink, _receiver) = FrameSink::builder()
///     .capacity(4)
///     .policy(SinkPolicy::BlockWithTimeout(Duration::from_millis(20)))
///     .build()
///     .expect("failed to build FrameSink");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FrameSinkBuilder {
    capacity: usize,
    policy: SinkPolicy,
}

impl Default for FrameSinkBuilder {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_SINK_CAPACITY,
            policy: SinkPolicy::default(),
        }
    }
}

impl FrameSinkBuilder {
    /// Set the number of frames the sink holds before its policy applies.
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        debug_assert!(capacity > 0, "capacity must be greater than zero");
        self.capacity = capacity;
        self
    }

    /// Set the behaviour when the sink is full.
    #[must_use]
    pub fn policy(mut self, policy: SinkPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the configured [`FrameSink`] and [`FrameReceiver`].
    ///
    /// # Errors
    ///
    /// Returns [`SinkConfigError::InvalidCapacity`] if the capacity is zero or
    /// strictly greater than [`super::MAX_SINK_CAPACITY`].
    pub fn build(self) -> Result<(FrameSink, FrameReceiver), SinkConfigError> {
        FrameSink::build_with(self.capacity, self.policy)
    }
}
