//! Value model for Strata.
//!
//! Every table, row and cell is an immutable [`Value`]. Primitives are held
//! inline; maps and sets are prolly trees of chunks in an
//! [`ObjectStore`](strata_store::ObjectStore) and are referenced by their
//! root chunk, so a `Value` is always cheap to clone and compare.
//!
//! # Key Types
//!
//! - [`Value`] / [`Kind`] -- the discriminated value and its kind
//! - [`Map`] / [`Set`] -- ordered persistent collections
//! - [`Struct`] -- a named record with fields kept in name order
//! - [`Sequence`] -- the persistent tree shared by maps and sets
//!
//! # Ordering
//!
//! Values are totally ordered: `Bool < Float < String < composites`, with
//! primitives compared by value and composites (refs, maps, sets, structs)
//! compared by hash. Collections store their keys in this order and every
//! diff walks it.

pub mod error;
pub mod map;
pub mod sequence;
pub mod set;
pub mod structs;
pub mod value;

pub use error::{ValueError, ValueResult};
pub use map::{Map, MapEditor};
pub use sequence::{Entry, Sequence};
pub use set::{Set, SetEditor};
pub use structs::{Struct, StructEditor};
pub use value::{Float, Kind, Value};
