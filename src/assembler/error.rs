//! Errors raised by the frame assembler.

use thiserror::Error;

/// Errors returned when feeding the assembler.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
    /// The assembler was stopped and accepts no more packets.
    #[error("frame assembler is closed")]
    Closed,
}
