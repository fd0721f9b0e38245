//! Error types for the wire format layer.

use thiserror::Error;

/// A query response frame that cannot be parsed.
///
/// Parsers return an error without committing any partial state; the engine
/// treats every variant the same way (fall back to the default pin layout).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame too short: {0} bytes")]
    TooShort(usize),

    #[error("expected sysex start byte 0xF0, found {0:#04X}")]
    MissingStart(u8),

    #[error("expected command byte {expected:#04X}, found {found:#04X}")]
    UnexpectedCommand { expected: u8, found: u8 },

    #[error("sysex end byte 0xF7 not found")]
    MissingEnd,
}
