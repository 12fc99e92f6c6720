//! Merge engine for Strata.
//!
//! Three-way structural merge of maps, sets and structs. Given a common
//! ancestor and two descendants, the merger diffs each descendant against the
//! ancestor, walks both change streams in key order, and applies every change
//! that does not collide. Colliding nested collections of the same kind are
//! merged recursively; anything else becomes a [`Conflict`] addressed by a
//! [`Path`] from the root.
//!
//! The merged value is built by editing the ancestor, so unchanged subtrees
//! are shared with the inputs.
//!
//! # Example
//!
//! ```
//! use strata_merge::{MergeOptions, Merger};
//! use strata_store::InMemoryObjectStore;
//! use strata_value::{Map, Value};
//!
//! let store = InMemoryObjectStore::new();
//! let base = Map::from_entries(&store, [(Value::from("a"), Value::from(1.0))]).unwrap();
//! let mut ours = base.edit();
//! ours.set(Value::from("b"), Value::from(2.0));
//! let ours = ours.apply(&store).unwrap();
//! let mut theirs = base.edit();
//! theirs.set(Value::from("c"), Value::from(3.0));
//! let theirs = theirs.apply(&store).unwrap();
//!
//! let merger = Merger::new(&store, MergeOptions::default());
//! let outcome = merger
//!     .merge_values(&base.into(), &ours.into(), &theirs.into())
//!     .unwrap();
//! assert!(outcome.is_clean());
//! assert_eq!(outcome.merged.as_map().unwrap().len(), 3);
//! ```

pub mod candidate;
pub mod config;
pub mod conflict;
pub mod error;
pub mod merge;
pub mod path;

pub use candidate::Candidate;
pub use config::{ConflictStrategy, MergeOptions};
pub use conflict::{Conflict, MergeOutcome};
pub use error::{MergeError, MergeResult};
pub use merge::Merger;
pub use path::{Path, PathElement};
