use serde::{Deserialize, Serialize};
use tcw_types::{PageImage, PageUpdate, ProjectMode, PromptKind};

/// Reply to a job submission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub process_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One page of recognition output as reported by the status endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResultEntry {
    pub page: usize,
    #[serde(default)]
    pub ocr_engine_result: Option<String>,
    #[serde(default)]
    pub mllm_only_result: Option<String>,
    #[serde(default)]
    pub mllm_merged_result: Option<String>,
}

impl From<PageResultEntry> for PageUpdate {
    fn from(entry: PageResultEntry) -> Self {
        PageUpdate {
            page: entry.page,
            base_engine: entry.ocr_engine_result,
            secondary_engine: entry.mllm_only_result,
            merged: entry.mllm_merged_result,
        }
    }
}

/// Reply to a status query.
///
/// Every field is optional on the wire; `status` defaults to empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<PageResultEntry>>,
    #[serde(default)]
    pub result_tei: Option<String>,
    #[serde(default)]
    pub result_text_content_only: Option<String>,
}

impl StatusResponse {
    pub fn with_status(status: impl Into<String>) -> Self {
        Self { status: status.into(), ..Default::default() }
    }

    /// The explicit error message, if present and non-blank.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.trim().is_empty())
    }
}

/// Recognition job parameters plus every page image.
#[derive(Clone, Debug)]
pub struct RecognitionRequest {
    pub images: Vec<PageImage>,
    pub llm_model: String,
    pub htr_model_id: u64,
    pub temperature: f32,
    pub mode: ProjectMode,
}

/// Final-document job parameters.
///
/// A single image is sent as `image`; several as `image_0..` with a page count.
#[derive(Clone, Debug)]
pub struct FinalDocumentRequest {
    pub images: Vec<PageImage>,
    pub text: String,
    pub llm_model: String,
    pub prompt: PromptKind,
    pub custom_prompt: Option<String>,
    pub temperature: f32,
    pub mode: ProjectMode,
}

impl FinalDocumentRequest {
    pub fn page_count(&self) -> usize {
        self.images.len()
    }

    pub fn is_multi_page(&self) -> bool {
        self.images.len() > 1
    }
}

/// The structured document produced by a final-document job.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalDocument {
    pub document: String,
    /// The document's text content without markup.
    pub plain_text: String,
}

/// Payload carried by a completed job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    PageResults(Vec<PageUpdate>),
    FinalDocument(FinalDocument),
}

/// What a status reply (or a failed status request) means for the handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollEvent {
    /// The handle is not polling; the reply is discarded.
    Ignored,
    /// Still running; carries the status string to display.
    Progress(String),
    Completed(JobOutcome),
    /// Terminal failure. `None` when no server message is available.
    Failed(Option<String>),
}

impl PollEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }
}
