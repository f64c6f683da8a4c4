//! Core of the transcript correction workbench.
//!
//! Ties the page store, the two comparison surfaces and the remote job
//! pipeline together: images are sent for recognition, the returned text
//! variants are compared and merged line by line, and the chosen text is
//! turned into a final structured document.
//!
//! # Key Types
//!
//! - [`Workbench`] -- the orchestrator owning all session state
//! - [`VersionSelector`] -- maps version keys to surface content
//! - [`ComparisonView`] -- surfaces, diff, cursor and deferred recomputation
//! - [`WorkbenchConfig`] -- TOML configuration

pub mod comparison;
pub mod config;
pub mod context;
pub mod error;
pub mod selector;
pub mod workbench;

pub use comparison::{ComparisonView, CursorPolicy};
pub use config::{FinalDocumentOptions, RecognitionOptions, WorkbenchConfig, MAX_PAGES};
pub use context::SessionContext;
pub use error::{ValidationError, WorkbenchError, WorkbenchResult};
pub use selector::VersionSelector;
pub use workbench::{SessionCommand, Workbench};

// Re-export key types
pub use tcw_jobs::{FinalDocument, JobBackend};
pub use tcw_types::{JobId, JobState, PageImage, ProjectMode, PromptKind, Surface, VersionKey};
