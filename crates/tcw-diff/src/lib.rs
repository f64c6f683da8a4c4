//! Diff engine for the transcript workbench.
//!
//! Compares the two comparison surfaces by line position and produces
//! character-level spans plus a compact navigation index, and provides the
//! cursor used to step through and merge differing lines.
//!
//! # Key Types
//!
//! - [`DiffOutput`] / [`DiffSpan`] / [`DiffIndexEntry`] -- result of [`compute`]
//! - [`DiffNavigator`] / [`Highlight`] -- cursor over the index

pub mod cleanup;
pub mod engine;
pub mod navigator;

pub use cleanup::{line_edits, Edit};
pub use engine::{compute, DiffIndexEntry, DiffOutput, DiffSpan, SpanKind};
pub use navigator::{line_at, replace_line, DiffNavigator, Highlight};
