//! Hashing primitives for Strata.
//!
//! Provides domain-separated BLAKE3 hashing. Values, leaf chunks and index
//! chunks each hash under their own domain tag, so a value and a chunk that
//! happen to share bytes never share an id.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod hasher;

pub use hasher::ContentHasher;
