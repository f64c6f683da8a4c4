//! Foundation types for the transcript workbench.
//!
//! This crate provides the shared vocabulary used by every other `tcw-*`
//! crate: the two comparison surfaces, the closed set of per-page text
//! variants, page records, and remote job identifiers.
//!
//! # Key Types
//!
//! - [`Surface`] -- left or right comparison pane
//! - [`VersionKey`] -- one of the five text variants tracked per page
//! - [`PageResult`] -- all text variants for one page
//! - [`PageImage`] -- raw page image bytes forwarded to the services
//! - [`JobId`] / [`JobKind`] / [`JobState`] -- remote job tracking

pub mod error;
pub mod job;
pub mod options;
pub mod page;
pub mod surface;

pub use error::TypeError;
pub use job::{JobId, JobKind, JobState};
pub use options::{ProjectMode, PromptKind};
pub use page::{PageImage, PageResult, PageUpdate};
pub use surface::{Surface, SurfaceBindings, VersionKey};
