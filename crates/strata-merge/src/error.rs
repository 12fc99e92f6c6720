//! Error types for the merge crate.
//!
//! Conflicts are not errors: they are collected in the merge outcome. These
//! variants abort a merge and no partial result is returned.

use strata_diff::DiffError;
use strata_store::StoreError;
use strata_value::ValueError;

/// Errors that can abort a merge.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// A chunk could not be read from (or written to) the store.
    #[error("storage read failed: {0}")]
    StorageRead(#[from] StoreError),

    /// The inputs broke a structural contract, e.g. a struct keyed by a
    /// non-string value.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl From<DiffError> for MergeError {
    fn from(err: DiffError) -> Self {
        match err {
            DiffError::StorageRead(e) => Self::StorageRead(e),
            other => Self::InvariantViolation(other.to_string()),
        }
    }
}

impl From<ValueError> for MergeError {
    fn from(err: ValueError) -> Self {
        match err {
            ValueError::Store(e) => Self::StorageRead(e),
            other => Self::InvariantViolation(other.to_string()),
        }
    }
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use strata_types::ObjectId;

    #[test]
    fn store_failures_map_to_storage_read() {
        let err: MergeError = DiffError::StorageRead(StoreError::NotFound(ObjectId::null())).into();
        assert!(matches!(err, MergeError::StorageRead(StoreError::NotFound(_))));

        let err: MergeError = ValueError::Store(StoreError::NullObjectId).into();
        assert!(matches!(err, MergeError::StorageRead(_)));
    }

    #[test]
    fn other_failures_are_invariant_violations() {
        let err: MergeError = DiffError::ProducerPanicked.into();
        assert!(matches!(err, MergeError::InvariantViolation(_)));

        let err: MergeError = ValueError::UnsortedEntries.into();
        assert!(err.to_string().starts_with("invariant violation"));
    }
}
