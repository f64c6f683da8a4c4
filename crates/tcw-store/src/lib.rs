//! Per-page result storage for the transcript workbench.
//!
//! The store is the single source of truth for every text variant of a
//! loaded document. Records are indexed `0..n` contiguously and the whole
//! array is rebuilt when a new batch of images is loaded.
//!
//! # Design Rules
//!
//! 1. Exactly one [`PageResult`](tcw_types::PageResult) per loaded image.
//! 2. Writes to pages outside `0..n` are ignored, reads fail.
//! 3. Engine payloads only overwrite fields they actually carry.
//! 4. User slots are written back only when the live text differs.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::PageResultStore;
