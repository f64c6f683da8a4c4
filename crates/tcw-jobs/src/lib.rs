//! Remote job tracking for the transcript workbench.
//!
//! Recognition and final-document generation run as long jobs on a remote
//! service. This crate submits them, polls their status on a fixed interval
//! and turns the replies into [`PollEvent`]s.
//!
//! # Key Types
//!
//! - [`JobPoller`] -- state machine for the single live job handle
//! - [`JobBackend`] -- async interface to the remote service
//! - [`HttpJobBackend`] -- reqwest implementation of [`JobBackend`]
//! - [`CancellableTask`] -- a spawned request that can be aborted or awaited

pub mod backend;
pub mod error;
pub mod http;
pub mod poller;
pub mod task;
pub mod types;

pub use backend::JobBackend;
pub use error::{JobError, JobResult};
pub use http::{Endpoints, HttpJobBackend};
pub use poller::{JobHandle, JobPoller, StatusRules};
pub use task::CancellableTask;
pub use types::{
    FinalDocument, FinalDocumentRequest, JobOutcome, PageResultEntry, PollEvent,
    RecognitionRequest, StatusResponse, SubmitResponse,
};
