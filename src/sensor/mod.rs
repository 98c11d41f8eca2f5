//! Radar front-end settings that fix the frame length.
//!
//! The capture card streams raw samples without frame markers, so the frame
//! length must be derived from the chirp configuration the radar was
//! programmed with.

mod error;
mod profile;

use std::{num::NonZeroUsize, time::Duration};

pub use error::SensorConfigError;

/// Bytes per real ADC sample on the LVDS stream.
pub const DEFAULT_BYTES_PER_SAMPLE: u32 = 2;

/// Chirp and antenna geometry of one radar frame.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use adcframe::sensor::SensorConfig;
///
/// let sensor = SensorConfig::new(2, 3, 2, 256, Duration::from_millis(100));
/// let frame_len = sensor.frame_byte_length().expect("valid geometry");
/// assert_eq!(frame_len.get(), 2 * 3 * 2 * 256 * 2);
/// assert_eq!(sensor.default_gap_timeout(), Duration::from_millis(200));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorConfig {
    /// Chirp loops per frame (chirps per frame divided by tx antennas).
    pub chirp_loops: u32,
    /// Enabled receive antennas.
    pub rx_antennas: u32,
    /// Enabled transmit antennas.
    pub tx_antennas: u32,
    /// ADC samples per chirp.
    pub adc_samples: u32,
    /// Bytes per sample component.
    pub bytes_per_sample: u32,
    /// Whether each sample carries an I and a Q component.
    pub complex: bool,
    /// Time between frame starts.
    pub frame_period: Duration,
}

impl SensorConfig {
    /// Describe a real-sampled front end with 16-bit samples.
    #[must_use]
    pub const fn new(
        chirp_loops: u32,
        rx_antennas: u32,
        tx_antennas: u32,
        adc_samples: u32,
        frame_period: Duration,
    ) -> Self {
        Self {
            chirp_loops,
            rx_antennas,
            tx_antennas,
            adc_samples,
            bytes_per_sample: DEFAULT_BYTES_PER_SAMPLE,
            complex: false,
            frame_period,
        }
    }

    /// Switch between real and complex (I/Q) sampling.
    #[must_use]
    pub const fn with_complex(mut self, complex: bool) -> Self {
        self.complex = complex;
        self
    }

    /// Override the bytes per sample component.
    #[must_use]
    pub const fn with_bytes_per_sample(mut self, bytes: u32) -> Self {
        self.bytes_per_sample = bytes;
        self
    }

    /// Parse an mmWave CLI profile (`.cfg`).
    ///
    /// # Errors
    ///
    /// Returns a [`SensorConfigError`] naming the missing command or bad
    /// argument.
    pub fn from_radar_cfg(text: &str) -> Result<Self, SensorConfigError> { profile::parse(text) }

    /// Length of one frame in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SensorConfigError::EmptyFrame`] if any factor is zero and
    /// [`SensorConfigError::FrameLengthOverflow`] if the product does not
    /// fit in `usize`.
    pub fn frame_byte_length(&self) -> Result<NonZeroUsize, SensorConfigError> {
        let components: u64 = if self.complex { 2 } else { 1 };
        let bytes = [
            self.chirp_loops,
            self.rx_antennas,
            self.tx_antennas,
            self.adc_samples,
            self.bytes_per_sample,
        ]
        .into_iter()
        .map(u64::from)
        .try_fold(components, u64::checked_mul)
        .ok_or(SensorConfigError::FrameLengthOverflow)?;
        let bytes = usize::try_from(bytes).map_err(|_| SensorConfigError::FrameLengthOverflow)?;
        NonZeroUsize::new(bytes).ok_or(SensorConfigError::EmptyFrame)
    }

    /// Age after which an incomplete frame is abandoned: two frame periods.
    #[must_use]
    pub fn default_gap_timeout(&self) -> Duration { self.frame_period.saturating_mul(2) }
}
