//! Foundation types for Strata.
//!
//! Every persisted thing in Strata, from a leaf chunk of a map to a whole
//! table snapshot, is addressed by the hash of its content. This crate holds
//! that identifier and the errors produced while parsing it. Every other
//! Strata crate depends on `strata-types`.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- Content-addressed identifier (BLAKE3 digest)

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::ObjectId;
