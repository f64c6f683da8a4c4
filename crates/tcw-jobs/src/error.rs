use thiserror::Error;

use tcw_types::JobState;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("server reply carried no job id")]
    MissingJobId,

    #[error("remote error: {0}")]
    Remote(String),

    #[error("invalid job transition: {from} -> {to}")]
    InvalidTransition { from: JobState, to: JobState },

    #[error("request cancelled")]
    Cancelled,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed reply: {0}")]
    Decode(String),
}

impl JobError {
    /// Server-provided message, if the failure came from the remote side.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Remote(msg) => Some(msg),
            _ => None,
        }
    }
}

pub type JobResult<T> = Result<T, JobError>;
