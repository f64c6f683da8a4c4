/// Errors from page store operations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The requested page does not exist.
    #[error("page {page} out of range: store holds {len} page(s)")]
    PageOutOfRange { page: usize, len: usize },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
