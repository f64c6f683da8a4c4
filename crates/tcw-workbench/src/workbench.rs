use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{interval, interval_at, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use tcw_jobs::task::join_slot;
use tcw_jobs::{
    CancellableTask, FinalDocument, FinalDocumentRequest, HttpJobBackend, JobBackend, JobOutcome,
    JobResult, PollEvent, RecognitionRequest, StatusResponse,
};
use tcw_store::PageResultStore;
use tcw_types::{JobId, JobKind, JobState, PageImage, Surface, VersionKey};

use crate::comparison::ComparisonView;
use crate::config::{FinalDocumentOptions, RecognitionOptions, WorkbenchConfig, MAX_PAGES};
use crate::context::SessionContext;
use crate::error::{ValidationError, WorkbenchError, WorkbenchResult};
use crate::selector::VersionSelector;

/// When the session loop hands control back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoopExit {
    JobEnds,
    InputsClosed,
}

/// User input delivered to a running session or job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    Edit { surface: Surface, text: String },
    Select { surface: Surface, key: VersionKey },
    NextDifference,
    PrevDifference,
    MergeLine(Surface),
    SwitchPage(usize),
    Cancel,
}

/// The correction workbench: page store, comparison view and job pipeline.
///
/// Owned by a single task; every operation takes `&mut self`.
pub struct Workbench {
    config: WorkbenchConfig,
    backend: Arc<dyn JobBackend>,
    store: PageResultStore,
    session: SessionContext,
    view: ComparisonView,
    final_document: Option<FinalDocument>,
}

impl Workbench {
    pub fn new(config: WorkbenchConfig, backend: Arc<dyn JobBackend>) -> Self {
        let session = SessionContext::new(config.bindings(), config.status_rules());
        Self {
            config,
            backend,
            store: PageResultStore::new(),
            session,
            view: ComparisonView::new(),
            final_document: None,
        }
    }

    /// Workbench talking HTTP to `config.server_url`.
    pub fn connect(config: WorkbenchConfig) -> Self {
        let backend = HttpJobBackend::with_endpoints(&config.server_url, config.endpoints.clone());
        Self::new(config, Arc::new(backend))
    }

    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    pub fn store(&self) -> &PageResultStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PageResultStore {
        &mut self.store
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn view(&self) -> &ComparisonView {
        &self.view
    }

    pub fn active_page(&self) -> usize {
        self.session.active_page
    }

    pub fn job_state(&self) -> JobState {
        self.session.poller.state()
    }

    pub fn status_text(&self) -> Option<&str> {
        self.session.poller.status_text()
    }

    pub fn actions_enabled(&self) -> bool {
        self.session.actions_enabled()
    }

    /// The latest generated document, if any.
    pub fn final_document(&self) -> Option<&FinalDocument> {
        self.final_document.as_ref()
    }

    // ---- Pages and versions ----

    /// Replace the document with `images`, one empty page each.
    pub fn load_images(&mut self, images: Vec<PageImage>) -> WorkbenchResult<()> {
        self.ensure_idle()?;
        info!(pages = images.len(), "loading images");
        self.store.load_images(images);
        self.session.active_page = 0;
        self.final_document = None;
        self.view.clear();
        self.refresh_surfaces();
        Ok(())
    }

    /// Show variant `key` on `surface`.
    pub fn select(&mut self, surface: Surface, key: VersionKey) {
        let deadline = self.settle_deadline();
        VersionSelector::select(&self.store, &mut self.session, &mut self.view, surface, key, deadline);
    }

    /// Make `page` the active page, keeping the current version bindings.
    ///
    /// Pending user-slot edits are written to the page they were made on first.
    pub fn switch_page(&mut self, page: usize) -> WorkbenchResult<()> {
        self.store.get(page)?;
        self.reconcile();
        self.session.active_page = page;
        self.refresh_surfaces();
        debug!(page, "switched page");
        Ok(())
    }

    /// Replace a surface's content with the user's edit.
    pub fn edit(&mut self, surface: Surface, text: impl Into<String>) {
        let deadline = Instant::now() + self.config.edit_quiet();
        self.view.edit(surface, text, deadline);
    }

    pub fn next_difference(&mut self) -> bool {
        self.view.next()
    }

    pub fn prev_difference(&mut self) -> bool {
        self.view.prev()
    }

    /// Copy the cursor's line from `source` to the other surface.
    pub fn merge_line(&mut self, source: Surface) -> Option<usize> {
        let deadline = self.settle_deadline();
        self.view.merge_line(source, deadline)
    }

    /// Write user-slot surfaces back to the active page.
    pub fn reconcile(&mut self) -> usize {
        if !self.session.has_user_slot_binding() {
            return 0;
        }
        VersionSelector::reconcile(&mut self.store, &self.session, &self.view)
    }

    /// Run a due diff recomputation. Returns `true` if one ran.
    pub fn settle(&mut self, now: Instant) -> bool {
        self.view.settle(now)
    }

    /// Wait for the pending diff recomputation, if any, and run it.
    pub async fn settle_view(&mut self) {
        if let Some(deadline) = self.view.pending_deadline() {
            sleep_until(deadline).await;
            self.view.settle(Instant::now());
        }
    }

    // ---- Jobs ----

    /// Submit every loaded image for recognition and start polling.
    pub async fn start_recognition(&mut self, options: &RecognitionOptions) -> WorkbenchResult<JobId> {
        self.ensure_idle()?;
        let count = self.store.images().len();
        if count == 0 {
            return Err(ValidationError::NoImages.into());
        }
        options.validate()?;
        if count > MAX_PAGES {
            return Err(ValidationError::TooManyPages { count, max: MAX_PAGES }.into());
        }

        self.view.clear();
        self.store.clear_engine_results();

        let request = RecognitionRequest {
            images: self.store.images().to_vec(),
            llm_model: options.llm_model.clone(),
            htr_model_id: options.htr_model_id,
            temperature: options.temperature,
            mode: options.mode,
        };
        let submitted = self.backend.submit_recognition(&request).await;
        self.track(JobKind::Recognition, submitted)
    }

    /// Submit the chosen text for final-document generation and start polling.
    ///
    /// With one page the right surface's live text is sent; with several,
    /// every page's right-bound variant is joined with a blank line.
    pub async fn generate_final_document(
        &mut self,
        options: &FinalDocumentOptions,
    ) -> WorkbenchResult<JobId> {
        self.ensure_idle()?;
        self.reconcile();
        options.validate()?;

        let count = self.store.len();
        if count == 0 {
            return Err(ValidationError::NoImages.into());
        }
        if count > MAX_PAGES {
            return Err(ValidationError::TooManyPages { count, max: MAX_PAGES }.into());
        }

        let (text, images) = if count == 1 {
            let text = self.view.text(Surface::Right);
            if text.trim().is_empty() {
                return Err(ValidationError::EmptySurface(Surface::Right).into());
            }
            let image = self
                .store
                .image(self.session.active_page)
                .ok_or(ValidationError::NoActiveImage)?;
            (text.to_string(), vec![image.clone()])
        } else {
            let key = self.session.bindings.right;
            if let Some(page) = self.store.first_missing(key) {
                return Err(ValidationError::MissingPageText { page_number: page + 1 }.into());
            }
            if self.store.images().len() != count {
                return Err(ValidationError::NoActiveImage.into());
            }
            let text = self
                .store
                .pages()
                .iter()
                .map(|page| page.text(key))
                .collect::<Vec<_>>()
                .join("\n\n");
            (text, self.store.images().to_vec())
        };

        let request = FinalDocumentRequest {
            images,
            text,
            llm_model: options.llm_model.clone(),
            prompt: options.prompt,
            custom_prompt: options.custom_prompt.clone(),
            temperature: options.temperature,
            mode: options.mode,
        };
        let submitted = self.backend.submit_final_document(&request).await;
        let id = self.track(JobKind::FinalDocument, submitted)?;
        self.final_document = None;
        Ok(id)
    }

    /// Stop tracking the current job and hide its status.
    pub fn cancel_job(&mut self) {
        self.session.poller.cancel();
    }

    /// Poll the current job until it completes, fails or is cancelled.
    ///
    /// Commands from `inputs` are applied between polls; the reconciliation
    /// sweep and deferred diff passes keep running. A rejected command is
    /// logged and the job carries on. Returns the final state: `Completed`,
    /// or `Idle` after cancellation. A failed job is an error.
    ///
    /// Cancellation returns at once. A status request still running is
    /// aborted, so its reply can never reach the store.
    pub async fn drive_job(
        &mut self,
        inputs: &mut mpsc::Receiver<SessionCommand>,
    ) -> WorkbenchResult<JobState> {
        if !self.session.poller.is_polling() {
            return Ok(self.job_state());
        }
        self.run_loop(inputs, LoopExit::JobEnds).await
    }

    /// Run an interactive session until `inputs` is closed.
    ///
    /// Commands are applied as they arrive, user-slot edits are swept into the
    /// store every reconcile interval, and deferred diff passes run on their
    /// deadlines. A job that is already polling keeps being polled; its
    /// failure is logged, not returned. Returns the job state at close.
    pub async fn drive_session(
        &mut self,
        inputs: &mut mpsc::Receiver<SessionCommand>,
    ) -> WorkbenchResult<JobState> {
        self.run_loop(inputs, LoopExit::InputsClosed).await
    }

    // ---- Internals ----

    async fn run_loop(
        &mut self,
        inputs: &mut mpsc::Receiver<SessionCommand>,
        exit: LoopExit,
    ) -> WorkbenchResult<JobState> {
        let mut poll = interval(self.config.poll_interval());
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let sweep_every = self.config.reconcile_interval();
        let mut sweep = interval_at(Instant::now() + sweep_every, sweep_every);
        let mut in_flight: Option<CancellableTask<JobResult<StatusResponse>>> = None;
        let mut inputs_open = true;

        loop {
            let deadline = self.view.pending_deadline();
            let polling = self.session.poller.is_polling();
            tokio::select! {
                biased;

                command = inputs.recv(), if inputs_open => match command {
                    Some(SessionCommand::Cancel) => {
                        self.cancel_job();
                        if let Some(task) = in_flight.take() {
                            task.cancel();
                        }
                        if exit == LoopExit::JobEnds {
                            return Ok(JobState::Idle);
                        }
                    }
                    Some(command) => {
                        if let Err(error) = self.apply_command(command) {
                            warn!(%error, "command rejected");
                        }
                    }
                    None if exit == LoopExit::InputsClosed => return Ok(self.job_state()),
                    None => inputs_open = false,
                },

                joined = join_slot(&mut in_flight) => {
                    let reply = joined.and_then(|reply| reply);
                    match (self.on_status_reply(reply).await, exit) {
                        (None, _) => {}
                        (Some(done), LoopExit::JobEnds) => return done,
                        (Some(Ok(state)), LoopExit::InputsClosed) => {
                            info!(state = %state, "job stopped");
                        }
                        (Some(Err(error)), LoopExit::InputsClosed) => {
                            warn!(%error, "job failed");
                        }
                    }
                },

                _ = poll.tick(), if polling => {
                    if in_flight.is_some() {
                        debug!("status request still in flight, skipping tick");
                        continue;
                    }
                    if let Some(id) = self.session.poller.on_tick() {
                        let backend = Arc::clone(&self.backend);
                        in_flight = Some(CancellableTask::spawn(async move {
                            backend.query_status(&id).await
                        }));
                    }
                },

                _ = sweep.tick() => {
                    self.reconcile();
                },

                _ = sleep_until_some(deadline) => {
                    self.view.settle(Instant::now());
                },
            }
        }
    }

    fn apply_command(&mut self, command: SessionCommand) -> WorkbenchResult<()> {
        match command {
            SessionCommand::Edit { surface, text } => self.edit(surface, text),
            SessionCommand::Select { surface, key } => self.select(surface, key),
            SessionCommand::NextDifference => {
                self.next_difference();
            }
            SessionCommand::PrevDifference => {
                self.prev_difference();
            }
            SessionCommand::MergeLine(source) => {
                self.merge_line(source);
            }
            SessionCommand::SwitchPage(page) => self.switch_page(page)?,
            SessionCommand::Cancel => self.cancel_job(),
        }
        Ok(())
    }

    /// Feed a status reply to the poller. Returns the loop's result once the
    /// job has stopped polling.
    async fn on_status_reply(
        &mut self,
        reply: JobResult<StatusResponse>,
    ) -> Option<WorkbenchResult<JobState>> {
        let event = match reply {
            Ok(response) => self.session.poller.on_status(response),
            Err(error) => self.session.poller.on_request_failed(&error),
        };
        match event {
            PollEvent::Ignored => Some(Ok(self.job_state())),
            PollEvent::Progress(status) => {
                info!(%status, "job progress");
                None
            }
            PollEvent::Completed(outcome) => {
                self.apply_outcome(outcome);
                self.settle_view().await;
                Some(Ok(JobState::Completed))
            }
            PollEvent::Failed(Some(message)) => Some(Err(WorkbenchError::RemoteJob(message))),
            PollEvent::Failed(None) => {
                Some(Err(WorkbenchError::Transport("status request failed".into())))
            }
        }
    }

    fn apply_outcome(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::PageResults(updates) => {
                let written: usize = updates.iter().map(|u| self.store.apply_page_payload(u)).sum();
                info!(pages = updates.len(), fields = written, "recognition results stored");
                self.refresh_surfaces();
            }
            JobOutcome::FinalDocument(document) => {
                info!(bytes = document.document.len(), "final document received");
                self.final_document = Some(document);
            }
        }
    }

    fn track(&mut self, kind: JobKind, submitted: JobResult<JobId>) -> WorkbenchResult<JobId> {
        match submitted {
            Ok(id) => {
                self.session.poller.submit(kind, id.clone())?;
                Ok(id)
            }
            Err(error) => {
                warn!(kind = %kind, %error, "job submission failed");
                self.session.poller.cancel();
                Err(error.into())
            }
        }
    }

    fn ensure_idle(&self) -> Result<(), ValidationError> {
        if self.session.actions_enabled() {
            Ok(())
        } else {
            Err(ValidationError::JobInFlight)
        }
    }

    fn refresh_surfaces(&mut self) {
        let deadline = self.settle_deadline();
        VersionSelector::apply_bindings(&self.store, &self.session, &mut self.view, deadline);
    }

    fn settle_deadline(&self) -> Instant {
        Instant::now() + self.config.settle_delay()
    }
}

async fn sleep_until_some(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
