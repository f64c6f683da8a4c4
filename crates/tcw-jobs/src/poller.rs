use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use tcw_types::{JobId, JobKind, JobState};

use crate::error::{JobError, JobResult};
use crate::types::{FinalDocument, JobOutcome, PollEvent, StatusResponse};

/// How status strings are classified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRules {
    /// Status that marks a finished job.
    pub completion_sentinel: String,
    /// Status prefix that marks a failed job.
    pub error_prefix: String,
}

impl Default for StatusRules {
    fn default() -> Self {
        Self {
            completion_sentinel: "Verarbeitung abgeschlossen".into(),
            error_prefix: "Fehler".into(),
        }
    }
}

/// The single live job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobHandle {
    pub id: JobId,
    pub kind: JobKind,
    pub state: JobState,
}

/// State machine tracking one remote job through interval polling.
///
/// The poller does no I/O. The caller issues a status request whenever
/// [`on_tick`](Self::on_tick) yields an id and feeds the reply back through
/// [`on_status`](Self::on_status) or
/// [`on_request_failed`](Self::on_request_failed).
#[derive(Clone, Debug, Default)]
pub struct JobPoller {
    rules: StatusRules,
    handle: Option<JobHandle>,
    status_text: Option<String>,
}

impl JobPoller {
    pub fn new(rules: StatusRules) -> Self {
        Self { rules, handle: None, status_text: None }
    }

    pub fn rules(&self) -> &StatusRules {
        &self.rules
    }

    pub fn handle(&self) -> Option<&JobHandle> {
        self.handle.as_ref()
    }

    pub fn state(&self) -> JobState {
        self.handle.as_ref().map_or(JobState::Idle, |h| h.state)
    }

    pub fn kind(&self) -> Option<JobKind> {
        self.handle.as_ref().map(|h| h.kind)
    }

    pub fn is_polling(&self) -> bool {
        self.state() == JobState::Polling
    }

    /// Dependent actions are enabled whenever no job occupies the remote side.
    pub fn actions_enabled(&self) -> bool {
        !self.state().is_active()
    }

    /// The status string currently shown to the user, if any.
    pub fn status_text(&self) -> Option<&str> {
        self.status_text.as_deref()
    }

    /// Track a freshly submitted job and start polling it.
    ///
    /// Any previous handle is discarded.
    pub fn submit(&mut self, kind: JobKind, id: JobId) -> JobResult<()> {
        self.reset();
        self.handle = Some(JobHandle { id, kind, state: JobState::Idle });
        self.advance(JobState::Submitted)?;
        self.advance(JobState::Polling)?;
        if let Some(handle) = &self.handle {
            info!(job = %handle.id.short_id(), kind = %kind, "polling job");
        }
        Ok(())
    }

    /// The id to query on this tick, or `None` once polling has stopped.
    pub fn on_tick(&self) -> Option<JobId> {
        self.handle
            .as_ref()
            .filter(|h| h.state == JobState::Polling)
            .map(|h| h.id.clone())
    }

    /// Apply a status reply.
    pub fn on_status(&mut self, response: StatusResponse) -> PollEvent {
        let Some(kind) = self.polling_kind() else {
            debug!(status = %response.status, "ignoring status for inactive job");
            return PollEvent::Ignored;
        };

        if let Some(message) = response.error_message() {
            let message = message.to_string();
            return self.fail(Some(message));
        }
        if response.status.starts_with(&self.rules.error_prefix) {
            return self.fail(Some(response.status));
        }

        self.status_text = Some(response.status.clone());
        if response.status != self.rules.completion_sentinel {
            return PollEvent::Progress(response.status);
        }

        let outcome = match kind {
            JobKind::Recognition => JobOutcome::PageResults(
                response
                    .results
                    .unwrap_or_default()
                    .into_iter()
                    .map(Into::into)
                    .collect(),
            ),
            JobKind::FinalDocument => JobOutcome::FinalDocument(FinalDocument {
                document: response.result_tei.unwrap_or_default(),
                plain_text: response.result_text_content_only.unwrap_or_default(),
            }),
        };
        self.set_state(JobState::Completed);
        info!(kind = %kind, "job completed");
        PollEvent::Completed(outcome)
    }

    /// Apply a failed status request (transport error, bad HTTP status, or
    /// an unparsable reply).
    pub fn on_request_failed(&mut self, error: &JobError) -> PollEvent {
        if self.polling_kind().is_none() {
            debug!(%error, "ignoring request failure for inactive job");
            return PollEvent::Ignored;
        }
        warn!(%error, "status request failed");
        self.fail(error.remote_message().map(str::to_string))
    }

    /// Stop tracking the job and hide the status, whatever the state.
    pub fn cancel(&mut self) {
        if let Some(handle) = &self.handle {
            info!(job = %handle.id.short_id(), state = %handle.state, "job cancelled");
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.handle = None;
        self.status_text = None;
    }

    fn polling_kind(&self) -> Option<JobKind> {
        self.handle
            .as_ref()
            .filter(|h| h.state == JobState::Polling)
            .map(|h| h.kind)
    }

    fn fail(&mut self, message: Option<String>) -> PollEvent {
        self.set_state(JobState::Failed);
        self.status_text = message.clone();
        warn!(message = message.as_deref().unwrap_or("<none>"), "job failed");
        PollEvent::Failed(message)
    }

    // Only called from Polling, where Completed and Failed are always legal.
    fn set_state(&mut self, next: JobState) {
        if let Err(error) = self.advance(next) {
            warn!(%error, "dropping illegal transition");
        }
    }

    fn advance(&mut self, next: JobState) -> JobResult<()> {
        let handle = self.handle.as_mut().ok_or(JobError::InvalidTransition {
            from: JobState::Idle,
            to: next,
        })?;
        if !handle.state.can_advance_to(next) {
            return Err(JobError::InvalidTransition { from: handle.state, to: next });
        }
        handle.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PageResultEntry;

    fn polling(kind: JobKind) -> JobPoller {
        let mut poller = JobPoller::new(StatusRules::default());
        poller.submit(kind, JobId::new("job-1").unwrap()).unwrap();
        poller
    }

    #[test]
    fn idle_poller_issues_no_requests() {
        let poller = JobPoller::default();
        assert_eq!(poller.state(), JobState::Idle);
        assert!(poller.on_tick().is_none());
        assert!(poller.actions_enabled());
    }

    #[test]
    fn submit_moves_to_polling() {
        let poller = polling(JobKind::Recognition);
        assert_eq!(poller.state(), JobState::Polling);
        assert_eq!(poller.on_tick().unwrap().as_str(), "job-1");
        assert!(!poller.actions_enabled());
    }

    #[test]
    fn progress_updates_status_text() {
        let mut poller = polling(JobKind::Recognition);
        let event = poller.on_status(StatusResponse::with_status("Texterkennung gestartet"));
        assert_eq!(event, PollEvent::Progress("Texterkennung gestartet".into()));
        assert_eq!(poller.status_text(), Some("Texterkennung gestartet"));
        assert!(poller.is_polling());
    }

    #[test]
    fn sentinel_completes_recognition_with_pages() {
        let mut poller = polling(JobKind::Recognition);
        let response = StatusResponse {
            status: "Verarbeitung abgeschlossen".into(),
            results: Some(vec![PageResultEntry {
                page: 0,
                mllm_merged_result: Some("Lieber Freund".into()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let PollEvent::Completed(JobOutcome::PageResults(pages)) = poller.on_status(response) else {
            panic!("expected page results");
        };
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].merged.as_deref(), Some("Lieber Freund"));
        assert_eq!(poller.state(), JobState::Completed);
        assert!(poller.on_tick().is_none());
        assert!(poller.actions_enabled());
    }

    #[test]
    fn sentinel_completes_final_document() {
        let mut poller = polling(JobKind::FinalDocument);
        let response = StatusResponse {
            status: "Verarbeitung abgeschlossen".into(),
            result_tei: Some("<TEI/>".into()),
            result_text_content_only: Some("text".into()),
            ..Default::default()
        };
        assert_eq!(
            poller.on_status(response),
            PollEvent::Completed(JobOutcome::FinalDocument(FinalDocument {
                document: "<TEI/>".into(),
                plain_text: "text".into(),
            }))
        );
    }

    #[test]
    fn sentinel_must_match_exactly() {
        let mut poller = polling(JobKind::Recognition);
        let event = poller.on_status(StatusResponse::with_status("Verarbeitung abgeschlossen."));
        assert!(matches!(event, PollEvent::Progress(_)));
        assert!(poller.is_polling());
    }

    #[test]
    fn error_field_fails_job() {
        let mut poller = polling(JobKind::Recognition);
        let response = StatusResponse {
            status: "Texterkennung gestartet".into(),
            error: Some("Modell nicht erreichbar".into()),
            ..Default::default()
        };
        assert_eq!(
            poller.on_status(response),
            PollEvent::Failed(Some("Modell nicht erreichbar".into()))
        );
        assert_eq!(poller.state(), JobState::Failed);
        assert_eq!(poller.status_text(), Some("Modell nicht erreichbar"));
        assert!(poller.on_tick().is_none());
    }

    #[test]
    fn error_prefix_fails_job() {
        let mut poller = polling(JobKind::Recognition);
        let status = "Fehler bei der Texterkennung bei Seite 2";
        assert_eq!(
            poller.on_status(StatusResponse::with_status(status)),
            PollEvent::Failed(Some(status.into()))
        );
    }

    #[test]
    fn transport_failure_fails_without_message() {
        let mut poller = polling(JobKind::FinalDocument);
        let event = poller.on_request_failed(&JobError::Transport("connection reset".into()));
        assert_eq!(event, PollEvent::Failed(None));
        assert_eq!(poller.state(), JobState::Failed);
    }

    #[test]
    fn late_reply_after_cancel_is_ignored() {
        let mut poller = polling(JobKind::Recognition);
        poller.cancel();
        assert_eq!(poller.state(), JobState::Idle);
        assert!(poller.status_text().is_none());
        assert_eq!(
            poller.on_status(StatusResponse::with_status("Verarbeitung abgeschlossen")),
            PollEvent::Ignored
        );
        assert_eq!(poller.state(), JobState::Idle);
    }

    #[test]
    fn terminal_handle_ignores_replies() {
        let mut poller = polling(JobKind::Recognition);
        poller.on_status(StatusResponse::with_status("Verarbeitung abgeschlossen"));
        assert_eq!(
            poller.on_status(StatusResponse::with_status("Fehler")),
            PollEvent::Ignored
        );
        assert_eq!(poller.on_request_failed(&JobError::Cancelled), PollEvent::Ignored);
        assert_eq!(poller.state(), JobState::Completed);
    }

    #[test]
    fn resubmit_replaces_handle() {
        let mut poller = polling(JobKind::Recognition);
        poller.on_status(StatusResponse::with_status("Fehler"));
        poller.submit(JobKind::FinalDocument, JobId::new("job-2").unwrap()).unwrap();
        assert_eq!(poller.kind(), Some(JobKind::FinalDocument));
        assert_eq!(poller.on_tick().unwrap().as_str(), "job-2");
        assert!(poller.status_text().is_none());
    }

    #[test]
    fn custom_rules() {
        let rules = StatusRules { completion_sentinel: "done".into(), error_prefix: "ERR".into() };
        let mut poller = JobPoller::new(rules);
        poller.submit(JobKind::Recognition, JobId::new("x").unwrap()).unwrap();
        assert!(matches!(
            poller.on_status(StatusResponse::with_status("ERR: boom")),
            PollEvent::Failed(Some(_))
        ));
    }
}
