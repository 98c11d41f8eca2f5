//! Errors raised while deriving frame geometry from sensor settings.

use thiserror::Error;

/// Errors returned by [`super::SensorConfig`] and its profile parser.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SensorConfigError {
    /// A required command is absent from the profile.
    #[error("radar profile has no `{0}` command")]
    MissingCommand(&'static str),
    /// A command has too few arguments.
    #[error("`{command}` is missing its {field} argument")]
    MissingField {
        /// Command being parsed.
        command: &'static str,
        /// Argument that was expected.
        field: &'static str,
    },
    /// An argument could not be parsed or is out of range.
    #[error("`{command}` has invalid {field} `{value}`")]
    InvalidField {
        /// Command being parsed.
        command: &'static str,
        /// Offending argument.
        field: &'static str,
        /// Text as found in the profile.
        value: String,
    },
    /// Chirps per frame do not split evenly across the transmit antennas.
    #[error("{chirps} chirps per frame do not divide across {tx_antennas} tx antennas")]
    UnevenChirps {
        /// Chirps per frame.
        chirps: u64,
        /// Enabled transmit antennas.
        tx_antennas: u32,
    },
    /// One of the geometry factors is zero.
    #[error("frame geometry yields an empty frame")]
    EmptyFrame,
    /// The frame length does not fit in memory addressing.
    #[error("frame geometry overflows the addressable frame length")]
    FrameLengthOverflow,
}
