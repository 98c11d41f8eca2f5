//! Helpers for exercising `adcframe` without capture hardware.
//!
//! Synthetic capture streams are built from a deterministic byte pattern so
//! assembled frames can be checked byte for byte:
//!
//! ```rust
//! use adcframe_testing::{CaptureStream, pattern_frame};
//!
//! let stream = CaptureStream::new(0, 3 * 64, 50);
//! let chunks = stream.chunks();
//! assert_eq!(chunks.len(), 4);
//! assert_eq!(chunks[1].offset, 50);
//! assert_eq!(pattern_frame(1, 64)[0], adcframe_testing::pattern_byte(64));
//! ```

pub mod logging;
pub mod metrics;
pub mod source;
pub mod stream;

pub use logging::{LoggerHandle, logger};
pub use source::{ScriptedFeed, ScriptedSource};
pub use stream::{CaptureStream, Chunk, pattern_byte, pattern_frame, reorder_within};
