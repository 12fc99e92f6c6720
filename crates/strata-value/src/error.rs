//! Error types for the value crate.

use strata_store::StoreError;

/// Errors that can occur while reading or building values.
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    /// A chunk could not be read, decoded, or written.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A sequence builder received keys out of order or duplicated.
    #[error("entries must be pushed in strictly ascending key order")]
    UnsortedEntries,

    /// An entry did not have the shape its collection requires.
    #[error("malformed entry: {0}")]
    MalformedEntry(String),
}

/// Convenience alias for value results.
pub type ValueResult<T> = Result<T, ValueError>;
