use thiserror::Error;

use tcw_types::Surface;

/// Local precondition failures. No request is sent when one is raised.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("no images loaded")]
    NoImages,

    #[error("{0} surface is empty")]
    EmptySurface(Surface),

    #[error("no image for the active page")]
    NoActiveImage,

    #[error("page {page_number} has no text for the selected version")]
    MissingPageText { page_number: usize },

    #[error("temperature {0} outside [0.0, 2.0]")]
    InvalidTemperature(f32),

    #[error("{count} pages exceed the limit of {max}")]
    TooManyPages { count: usize, max: usize },

    #[error("no handwriting model selected")]
    MissingHtrModel,

    #[error("custom prompt selected but no prompt text given")]
    EmptyCustomPrompt,

    #[error("a job is already running")]
    JobInFlight,
}

#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote job failed: {0}")]
    RemoteJob(String),

    #[error("store error: {0}")]
    Store(#[from] tcw_store::StoreError),

    #[error("job error: {0}")]
    Job(#[from] tcw_jobs::JobError),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WorkbenchResult<T> = Result<T, WorkbenchError>;
