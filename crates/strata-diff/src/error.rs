//! Error types for the diff crate.

use strata_store::StoreError;
use strata_value::ValueError;

/// Errors that can occur while producing a diff stream.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A chunk could not be read from the store.
    #[error("storage read failed: {0}")]
    StorageRead(#[from] StoreError),

    /// A chunk decoded but did not have the expected shape.
    #[error("malformed collection: {0}")]
    Malformed(String),

    /// The background producer thread died without finishing its stream.
    #[error("diff producer terminated unexpectedly")]
    ProducerPanicked,
}

impl From<ValueError> for DiffError {
    fn from(err: ValueError) -> Self {
        match err {
            ValueError::Store(e) => Self::StorageRead(e),
            other => Self::Malformed(other.to_string()),
        }
    }
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
