/// Errors from row store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or refused the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend reported a failure executing a statement.
    #[error("backend error: {0}")]
    Backend(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
