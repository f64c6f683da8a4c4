use async_trait::async_trait;
use tcw_types::JobId;

use crate::error::JobResult;
use crate::types::{FinalDocumentRequest, RecognitionRequest, StatusResponse};

/// Interface to the remote recognition and document service.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Submit every page image for recognition. Returns the new job's id.
    async fn submit_recognition(&self, request: &RecognitionRequest) -> JobResult<JobId>;

    /// Submit the chosen text for final-document generation.
    async fn submit_final_document(&self, request: &FinalDocumentRequest) -> JobResult<JobId>;

    /// Fetch the current status of a job.
    async fn query_status(&self, id: &JobId) -> JobResult<StatusResponse>;
}
