use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tcw_types::{JobId, PageImage};

use crate::backend::JobBackend;
use crate::error::{JobError, JobResult};
use crate::types::{FinalDocumentRequest, RecognitionRequest, StatusResponse, SubmitResponse};

/// Endpoint paths relative to the server URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub upload: String,
    pub final_document: String,
    pub status: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            upload: "/upload_image/".into(),
            final_document: "/create_tei/".into(),
            status: "/check_status/".into(),
        }
    }
}

/// [`JobBackend`] over HTTP multipart forms.
#[derive(Clone, Debug)]
pub struct HttpJobBackend {
    client: Client,
    base_url: String,
    endpoints: Endpoints,
}

impl HttpJobBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, Endpoints::default())
    }

    pub fn with_endpoints(base_url: impl Into<String>, endpoints: Endpoints) -> Self {
        Self::with_client(Client::new(), base_url, endpoints)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, endpoints: Endpoints) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url, endpoints }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn submit(&self, path: &str, form: Form) -> JobResult<JobId> {
        let response = self.client.post(self.url(path)).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let reply: SubmitResponse = decode_reply(status, &body, |r: &SubmitResponse| r.error.is_some())?;
        job_id_from(reply)
    }
}

#[async_trait]
impl JobBackend for HttpJobBackend {
    async fn submit_recognition(&self, request: &RecognitionRequest) -> JobResult<JobId> {
        let mut form = Form::new()
            .text("multimodal-llm-ocr", request.llm_model.clone())
            .text("transkribus-model", request.htr_model_id.to_string())
            .text("temperature-ocr", request.temperature.to_string())
            .text("mode", request.mode.as_str());
        for image in &request.images {
            form = form.part("images", image_part(image)?);
        }

        let id = self.submit(&self.endpoints.upload, form).await?;
        info!(job = %id.short_id(), pages = request.images.len(), "recognition submitted");
        Ok(id)
    }

    async fn submit_final_document(&self, request: &FinalDocumentRequest) -> JobResult<JobId> {
        let mut form = Form::new()
            .text("multimodal-llm-tei", request.llm_model.clone())
            .text("prompt-transformation-tei", request.prompt.as_str())
            .text("custom-prompt-text", request.custom_prompt.clone().unwrap_or_default())
            .text("merged_text", request.text.clone())
            .text("temperature-tei", request.temperature.to_string())
            .text("mode", request.mode.as_str());

        if request.is_multi_page() {
            for (i, image) in request.images.iter().enumerate() {
                form = form.part(format!("image_{i}"), image_part(image)?);
            }
            form = form.text("num_pages", request.page_count().to_string());
        } else if let Some(image) = request.images.first() {
            form = form.part("image", image_part(image)?);
        }

        let id = self.submit(&self.endpoints.final_document, form).await?;
        info!(job = %id.short_id(), pages = request.page_count(), "final document submitted");
        Ok(id)
    }

    async fn query_status(&self, id: &JobId) -> JobResult<StatusResponse> {
        let response = self
            .client
            .get(self.url(&self.endpoints.status))
            .query(&[("process_id", id.as_str())])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(job = %id.short_id(), http_status = status.as_u16(), "status reply");
        decode_reply(status, &body, |r: &StatusResponse| r.error_message().is_some())
    }
}

fn image_part(image: &PageImage) -> JobResult<Part> {
    Ok(Part::bytes(image.data.to_vec())
        .file_name(image.file_name.clone())
        .mime_str(&image.mime_type)?)
}

/// Parse a JSON reply. A non-success status is accepted only when the body
/// carries an error message for the caller to surface.
fn decode_reply<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
    has_error: impl Fn(&T) -> bool,
) -> JobResult<T> {
    match serde_json::from_str::<T>(body) {
        Ok(reply) if status.is_success() || has_error(&reply) => Ok(reply),
        Ok(_) => Err(JobError::Transport(format!("HTTP {status}"))),
        Err(err) if status.is_success() => Err(JobError::Decode(err.to_string())),
        Err(_) => Err(JobError::Transport(format!("HTTP {status}"))),
    }
}

fn job_id_from(reply: SubmitResponse) -> JobResult<JobId> {
    if let Some(message) = reply.error.filter(|m| !m.trim().is_empty()) {
        return Err(JobError::Remote(message));
    }
    let id = reply.process_id.ok_or(JobError::MissingJobId)?;
    JobId::new(id).map_err(|_| JobError::MissingJobId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let backend = HttpJobBackend::new("http://localhost:8000/");
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(backend.url("/check_status/"), "http://localhost:8000/check_status/");
    }

    #[test]
    fn decode_success() {
        let reply: StatusResponse =
            decode_reply(StatusCode::OK, r#"{"status": "läuft"}"#, |_: &StatusResponse| false).unwrap();
        assert_eq!(reply.status, "läuft");
    }

    #[test]
    fn decode_error_body_on_failure_status() {
        let reply: StatusResponse = decode_reply(
            StatusCode::NOT_FOUND,
            r#"{"error": "Prozess nicht gefunden"}"#,
            |r: &StatusResponse| r.error_message().is_some(),
        )
        .unwrap();
        assert_eq!(reply.error_message(), Some("Prozess nicht gefunden"));
    }

    #[test]
    fn decode_failure_status_without_message() {
        let err = decode_reply::<StatusResponse>(StatusCode::BAD_GATEWAY, "<html>", |_| false).unwrap_err();
        assert!(matches!(err, JobError::Transport(_)));
    }

    #[test]
    fn decode_garbage_on_success() {
        let err = decode_reply::<StatusResponse>(StatusCode::OK, "not json", |_| false).unwrap_err();
        assert!(matches!(err, JobError::Decode(_)));
    }

    #[test]
    fn job_id_from_reply() {
        let ok = SubmitResponse { process_id: Some("1234".into()), error: None };
        assert_eq!(job_id_from(ok).unwrap().as_str(), "1234");

        let missing = SubmitResponse::default();
        assert!(matches!(job_id_from(missing), Err(JobError::MissingJobId)));

        let remote = SubmitResponse { process_id: None, error: Some("Ungültiges Modell".into()) };
        assert_eq!(job_id_from(remote).unwrap_err().remote_message(), Some("Ungültiges Modell"));
    }
}
