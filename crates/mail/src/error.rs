//! Error types for the engine

use thiserror::Error;

use crate::remote::RemoteError;

/// Errors surfaced by engine operations.
///
/// Transient automation failures are retried internally and only appear here
/// as [`EngineError::ConnectionExhausted`] once the retry budget is spent.
/// Addressing and query errors are never retried.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Retries against the automation interface were exhausted.
    #[error("connection retries exhausted after {attempts} attempts: {source}")]
    ConnectionExhausted {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// The last underlying failure.
        source: anyhow::Error,
    },

    /// A folder path did not resolve to a folder.
    #[error("folder not found: {path}")]
    FolderNotFound { path: String },

    /// The search request was malformed (e.g. no usable terms).
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A page number outside the current result cache was requested.
    #[error("page {page} out of range (cache has {pages} pages)")]
    PageOutOfRange { page: usize, pages: usize },

    /// A record position outside the current result cache was requested.
    #[error("no record at position {position} (cache holds {count} records)")]
    PositionNotFound { position: usize, count: usize },

    /// A non-retryable automation failure.
    #[error("automation interface error: {0}")]
    Remote(RemoteError),
}

impl From<RemoteError> for EngineError {
    fn from(err: RemoteError) -> Self {
        Self::Remote(err)
    }
}

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;
