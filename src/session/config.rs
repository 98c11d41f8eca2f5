//! Validated settings for a capture session.

use std::{num::NonZeroUsize, time::Duration};

use static_assertions::const_assert;
use thiserror::Error;

use crate::{
    packet::OffsetMode,
    reorder::ReorderConfig,
    sensor::{SensorConfig, SensorConfigError},
    sink::{DEFAULT_SINK_CAPACITY, MAX_SINK_CAPACITY, SinkConfigError, SinkPolicy},
};

/// Packets held ahead of the expected offset when no capacity is configured.
pub const DEFAULT_REORDER_CAPACITY: usize = 64;
/// Largest supported reorder window.
pub const MAX_REORDER_CAPACITY: usize = 4096;
/// Gap timeout used when neither the caller nor a sensor profile sets one.
pub const DEFAULT_GAP_TIMEOUT: Duration = Duration::from_millis(100);
const MIN_GAP_POLL_INTERVAL: Duration = Duration::from_millis(1);

const_assert!(DEFAULT_REORDER_CAPACITY <= MAX_REORDER_CAPACITY);

/// Errors returned when validating a [`SessionConfig`].
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionConfigError {
    /// The frame length was zero.
    #[error("frame length must be at least one byte")]
    ZeroFrameLength,
    /// The reorder capacity was zero or above [`MAX_REORDER_CAPACITY`].
    #[error("invalid reorder capacity {0}; must be between 1 and {max}", max = MAX_REORDER_CAPACITY)]
    InvalidReorderCapacity(usize),
    /// The gap packet limit was zero.
    #[error("gap packet limit must be at least one packet")]
    ZeroGapPacketLimit,
    /// The gap timeout was zero.
    #[error("gap timeout must be non-zero")]
    ZeroGapTimeout,
    /// The sink settings were rejected.
    #[error(transparent)]
    Sink(#[from] SinkConfigError),
    /// The sensor geometry does not yield a frame length.
    #[error(transparent)]
    Sensor(#[from] SensorConfigError),
}

/// Settings for one capture session.
///
/// Built through [`SessionConfig::builder`] or [`SessionConfig::for_sensor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    frame_len: NonZeroUsize,
    offset_mode: OffsetMode,
    reorder: ReorderConfig,
    gap_poll_interval: Duration,
    sink_capacity: usize,
    sink_policy: SinkPolicy,
}

impl SessionConfig {
    /// Start configuring a session for frames of `frame_len` bytes.
    #[must_use]
    pub fn builder(frame_len: usize) -> SessionConfigBuilder { SessionConfigBuilder::new(frame_len) }

    /// Start configuring a session whose frame length and gap timeout come
    /// from the sensor geometry.
    ///
    /// # Errors
    ///
    /// Returns [`SessionConfigError::Sensor`] if the geometry is degenerate.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use adcframe::{sensor::SensorConfig, session::SessionConfig};
    ///
    /// let sensor = SensorConfig::new(64, 3, 2, 256, Duration::from_millis(250));
    /// let config = SessionConfig::for_sensor(&sensor)
    ///     .expect("valid sensor")
    ///     .build()
    ///     .expect("valid session config");
    /// assert_eq!(config.frame_len().get(), 196_608);
    /// assert_eq!(config.reorder().gap_timeout, Duration::from_millis(500));
    /// ```
    pub fn for_sensor(sensor: &SensorConfig) -> Result<SessionConfigBuilder, SessionConfigError> {
        let frame_len = sensor.frame_byte_length()?;
        Ok(SessionConfigBuilder::new(frame_len.get()).gap_timeout(sensor.default_gap_timeout()))
    }

    /// Fixed frame length in bytes.
    #[must_use]
    pub const fn frame_len(&self) -> NonZeroUsize { self.frame_len }

    /// How packet offsets are determined.
    #[must_use]
    pub const fn offset_mode(&self) -> OffsetMode { self.offset_mode }

    /// Reorder window bounds.
    #[must_use]
    pub const fn reorder(&self) -> ReorderConfig { self.reorder }

    /// How often an idle session checks for expired gaps.
    #[must_use]
    pub const fn gap_poll_interval(&self) -> Duration { self.gap_poll_interval }

    /// Frames the sink holds before its policy applies.
    #[must_use]
    pub const fn sink_capacity(&self) -> usize { self.sink_capacity }

    /// Behaviour of a full sink.
    #[must_use]
    pub const fn sink_policy(&self) -> SinkPolicy { self.sink_policy }
}

/// Builder for [`SessionConfig`].
#[derive(Clone, Copy, Debug)]
pub struct SessionConfigBuilder {
    frame_len: usize,
    offset_mode: OffsetMode,
    reorder_capacity: usize,
    gap_timeout: Duration,
    gap_packet_limit: Option<usize>,
    gap_poll_interval: Option<Duration>,
    sink_capacity: usize,
    sink_policy: SinkPolicy,
}

impl SessionConfigBuilder {
    fn new(frame_len: usize) -> Self {
        Self {
            frame_len,
            offset_mode: OffsetMode::default(),
            reorder_capacity: DEFAULT_REORDER_CAPACITY,
            gap_timeout: DEFAULT_GAP_TIMEOUT,
            gap_packet_limit: None,
            gap_poll_interval: None,
            sink_capacity: DEFAULT_SINK_CAPACITY,
            sink_policy: SinkPolicy::default(),
        }
    }

    /// Choose how packet offsets are determined.
    #[must_use]
    pub fn offset_mode(mut self, mode: OffsetMode) -> Self {
        self.offset_mode = mode;
        self
    }

    /// Set the number of packets the reorder window may hold.
    #[must_use]
    pub fn reorder_capacity(mut self, capacity: usize) -> Self {
        self.reorder_capacity = capacity;
        self
    }

    /// Set how long a gap may stay open before it is declared lost.
    #[must_use]
    pub fn gap_timeout(mut self, timeout: Duration) -> Self {
        self.gap_timeout = timeout;
        self
    }

    /// Set how many packets may arrive ahead of a gap before it is declared
    /// lost. Defaults to the reorder capacity.
    #[must_use]
    pub fn gap_packet_limit(mut self, limit: usize) -> Self {
        self.gap_packet_limit = Some(limit);
        self
    }

    /// Set how often an idle session checks for expired gaps. Defaults to a
    /// quarter of the gap timeout.
    #[must_use]
    pub fn gap_poll_interval(mut self, interval: Duration) -> Self {
        self.gap_poll_interval = Some(interval);
        self
    }

    /// Set the sink capacity in frames.
    #[must_use]
    pub fn sink_capacity(mut self, capacity: usize) -> Self {
        self.sink_capacity = capacity;
        self
    }

    /// Set the behaviour of a full sink.
    #[must_use]
    pub fn sink_policy(mut self, policy: SinkPolicy) -> Self {
        self.sink_policy = policy;
        self
    }

    /// Validate the settings.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionConfigError`] naming the first invalid setting.
    pub fn build(self) -> Result<SessionConfig, SessionConfigError> {
        let frame_len =
            NonZeroUsize::new(self.frame_len).ok_or(SessionConfigError::ZeroFrameLength)?;
        let capacity = NonZeroUsize::new(self.reorder_capacity)
            .filter(|capacity| capacity.get() <= MAX_REORDER_CAPACITY)
            .ok_or(SessionConfigError::InvalidReorderCapacity(self.reorder_capacity))?;
        if self.gap_timeout.is_zero() {
            return Err(SessionConfigError::ZeroGapTimeout);
        }
        let gap_packet_limit = match self.gap_packet_limit {
            Some(limit) => NonZeroUsize::new(limit).ok_or(SessionConfigError::ZeroGapPacketLimit)?,
            None => capacity,
        };
        if self.sink_capacity == 0 || self.sink_capacity > MAX_SINK_CAPACITY {
            return Err(SinkConfigError::InvalidCapacity(self.sink_capacity).into());
        }
        let gap_poll_interval = self
            .gap_poll_interval
            .unwrap_or(self.gap_timeout / 4)
            .max(MIN_GAP_POLL_INTERVAL);

        Ok(SessionConfig {
            frame_len,
            offset_mode: self.offset_mode,
            reorder: ReorderConfig::new(capacity, self.gap_timeout)
                .with_gap_packet_limit(gap_packet_limit),
            gap_poll_interval,
            sink_capacity: self.sink_capacity,
            sink_policy: self.sink_policy,
        })
    }
}
