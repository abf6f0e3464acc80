//! # blobhash core
//!
//! Pure primitives for blobhash: the checksum algorithm registry, the
//! streaming hash sink, and the checksum set it produces.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`ChecksumAlgorithm`] - A supported algorithm and its encoding rules
//! - [`AlgorithmSet`] - A non-empty set of requested algorithms
//! - [`HashSink`] - Incremental multi-algorithm hasher over a byte stream
//! - [`ChecksumSet`] - The finalized digests for one object
//!
//! ## Usage
//!
//! ```rust
//! use blobhash_core::{AlgorithmSet, HashSink};
//!
//! let mut sink = HashSink::new(AlgorithmSet::all());
//! sink.write(b"hello ").unwrap();
//! sink.write(b"world").unwrap();
//! let checksums = sink.finalize().unwrap();
//!
//! assert_eq!(checksums.auxiliary_metadata()["MD5"], "XrY7u+Ae7tCTyyK7j1rNww==");
//! assert_eq!(checksums.auxiliary_metadata()["CRC64NVME"], "0x8d29d5c3f6ea8ebe");
//! ```

pub mod algorithm;
pub mod checksums;
pub mod digest;
pub mod error;
pub mod sink;

pub use algorithm::{AlgorithmSet, ChecksumAlgorithm, DigestEncoding};
pub use checksums::ChecksumSet;
pub use digest::Digest;
pub use error::{CoreError, Result};
pub use sink::{checksums_of, HashSink, SinkState};
