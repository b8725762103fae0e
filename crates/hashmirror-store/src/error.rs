use thiserror::Error;

/// Errors produced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend reported a failure (connection lost, command rejected).
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
