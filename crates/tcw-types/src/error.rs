use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown version key: {0}")]
    UnknownVersionKey(String),

    #[error("unknown surface: {0}")]
    UnknownSurface(String),

    #[error("unknown project mode: {0}")]
    UnknownMode(String),

    #[error("unknown prompt type: {0}")]
    UnknownPrompt(String),

    #[error("empty job identifier")]
    EmptyJobId,
}
