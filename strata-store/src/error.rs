//! Content store error types.

use thiserror::Error;

use strata_core::ContentId;

/// Errors that can occur during content store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No entry exists for the requested id.
    #[error("cache entry not found: {0}")]
    NotFound(ContentId),

    /// A stored entry's bytes no longer hash to its filename.
    #[error("cache entry {expected} is corrupt (contents hash to {actual})")]
    Corrupt {
        /// The id the entry was stored under.
        expected: ContentId,
        /// The id recomputed from the stored bytes.
        actual: ContentId,
    },

    /// Underlying filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for content store operations.
pub type StoreResult<T> = Result<T, StoreError>;
