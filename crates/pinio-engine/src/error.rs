//! Error types for the engine.

use thiserror::Error;

/// Caller-facing failures.
///
/// Discovery problems never surface here: a malformed response or a timeout
/// degrades to the synthetic default pin table, observable only through the
/// `default_configuration_assumed` flag on the completion event.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("capability query already in progress")]
    QueryInProgress,

    #[error("no pin with digital id {0}")]
    UnknownPin(u8),
}

pub type Result<T> = std::result::Result<T, Error>;
