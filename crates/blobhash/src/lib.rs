//! # blobhash
//!
//! Computes several content checksums for an object while it streams from
//! an object store, then commits them back onto the object's properties
//! with a causally chained pair of conditional writes.
//!
//! ## Overview
//!
//! - **Streaming**: the object is downloaded once and every chunk is fed to
//!   one incremental hasher per algorithm; nothing is buffered.
//! - **Header**: the MD5 digest goes into the standard content-hash header.
//! - **Metadata**: every digest is written as `MD5`, `SHA256`, `CRC64NVME`
//!   metadata entries in canonical string form.
//! - **Concurrency**: the download and header write are conditioned on the
//!   object's version token; the metadata write is conditioned on the token
//!   the header write returned.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use blobhash::{BlobHasher, HashingConfig};
//! use blobhash::store::{MemoryObjectStore, ObjectRef};
//!
//! async fn example() {
//!     let store = MemoryObjectStore::new();
//!     let object = ObjectRef::new("mem://uploads/hello.txt");
//!     let token = store.put_object(&object, &b"hello world"[..]);
//!
//!     let hasher = BlobHasher::new(store, HashingConfig::default());
//!     let outcome = hasher.run(&object, &token, Some(11)).await.unwrap();
//!
//!     println!("{}", outcome.checksums);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `blobhash::core` - Algorithms, the hash sink, checksum sets
//! - `blobhash::store` - The object store trait and in-memory store

pub mod config;
pub mod error;
pub mod event;
pub mod hasher;

// Re-export component crates
pub use blobhash_core as core;
pub use blobhash_store as store;

// Re-export main types for convenience
pub use config::{HashingConfig, TokenPolicy, ENV_ALGORITHMS, ENV_ENVIRONMENT};
pub use error::{ConfigError, JobError, Result, Stage};
pub use event::{EventHandler, HandleOutcome, ObjectCreated, ObjectEvent, OBJECT_CREATED_EVENT};
pub use hasher::{BlobHasher, CommitOutcome};

pub use blobhash_core::{AlgorithmSet, ChecksumAlgorithm, ChecksumSet, Digest, HashSink};
pub use blobhash_store::{MemoryObjectStore, ObjectRef, ObjectStore, VersionToken};
