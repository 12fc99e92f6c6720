//! Content-addressed chunk storage for Strata.
//!
//! Persistent collections are stored as trees of immutable chunks, each
//! identified by the BLAKE3 hash of its bytes (domain-separated by chunk
//! kind). This crate is the key-value layer underneath them: it never
//! interprets chunk contents.
//!
//! # Object Types
//!
//! - [`ObjectKind::Leaf`] -- a chunk of sorted collection entries
//! - [`ObjectKind::Index`] -- a chunk of references to lower chunks
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//! - [`FaultInjectingStore`] -- wrapper that fails reads of chosen ids
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Writing the same bytes twice is a no-op, which is what makes unchanged
//!    subtrees shared between versions of a collection.
//! 3. Concurrent reads are always safe.
//! 4. All I/O errors are propagated, never retried here.

pub mod error;
pub mod fault;
pub mod memory;
pub mod object;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fault::FaultInjectingStore;
pub use memory::InMemoryObjectStore;
pub use object::{ObjectKind, StoredObject};
pub use traits::ObjectStore;
