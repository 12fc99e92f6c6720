//! Diff engine for Strata.
//!
//! Compares two versions of a map, set or struct and yields the changes in
//! key order as a lazy stream. Map and set diffs walk both prolly trees at
//! once and skip every subtree whose chunk id is the same on both sides, so
//! the work done tracks the size of the change rather than the size of the
//! collection.
//!
//! # Key Types
//!
//! - [`ValueChanged`] / [`ChangeKind`] -- one change at one key
//! - [`DiffStream`] -- lazy, ordered stream over any collection kind
//! - [`BackgroundDiff`] -- the same stream produced on a scoped thread
//! - [`ChangeSet`] -- a collected stream with per-kind counts

pub mod background;
pub mod change;
pub mod error;
pub mod sequence_diff;
pub mod stream;
pub mod struct_diff;

pub use background::BackgroundDiff;
pub use change::{ChangeKind, ChangeSet, ValueChanged};
pub use error::{DiffError, DiffResult};
pub use sequence_diff::SequenceDiff;
pub use stream::{diff_maps, diff_sets, diff_structs, DiffStream};
pub use struct_diff::StructDiff;
