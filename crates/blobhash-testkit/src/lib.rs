//! # blobhash testkit
//!
//! Testing utilities for blobhash.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known inputs with expected checksums in canonical form
//! - **Generators**: Proptest strategies for payloads, chunkings and algorithm sets
//! - **Fixtures**: An in-memory store with an object ready to hash
//!
//! ## Golden Vectors
//!
//! ```rust
//! use blobhash_testkit::vectors::{all_vectors, verify_vector};
//!
//! for vector in all_vectors() {
//!     verify_vector(&vector).unwrap();
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use blobhash_testkit::generators::chunked_payload;
//!
//! proptest! {
//!     #[test]
//!     fn chunking_invariant(chunked in chunked_payload(4096, 16)) {
//!         // hash chunked.chunks() and compare with the whole of chunked.data
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{shared_store_fixtures, TestFixture};
pub use generators::{algorithm_set, chunked_payload, payload, ChunkedPayload};
pub use vectors::{all_vectors, verify_all_vectors, verify_vector, ChecksumVector};
