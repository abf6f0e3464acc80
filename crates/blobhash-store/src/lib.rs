//! # blobhash store
//!
//! Object store abstraction for blobhash. The hashing protocol talks to the
//! store only through the [`ObjectStore`] trait, which exposes conditional
//! reads and writes keyed by opaque [`VersionToken`]s.
//!
//! ## Key Types
//!
//! - [`ObjectStore`] - The async trait for conditional object access
//! - [`ChunkStream`] - A conditioned download, pulled chunk by chunk
//! - [`MemoryObjectStore`] - In-memory store for tests and local runs
//! - [`VersionToken`] - Opaque entity tag used as a write precondition
//!
//! ## Usage
//!
//! ```rust,no_run
//! use blobhash_store::{MemoryObjectStore, ObjectRef, ObjectStore, StoreExt};
//!
//! async fn example() {
//!     let store = MemoryObjectStore::new();
//!     let object = ObjectRef::new("mem://container/report.csv");
//!     let token = store.put_object(&object, &b"a,b,c"[..]);
//!
//!     let mut bytes = Vec::new();
//!     store.download_to(&object, &token, &mut bytes).await.unwrap();
//!
//!     let new_token = store.set_content_hash(&object, &[0u8; 16], &token).await.unwrap();
//!     assert_ne!(token, new_token);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Conditional writes**: a write whose token does not match is rejected
//!   with `PreconditionFailed` and has no effect.
//! - **Fresh tokens**: every accepted write returns a new token; callers chain
//!   follow-up writes off the returned token.

pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{Result, StoreError};
pub use memory::{MemoryObjectStore, StoreOp, WriteRecord, DEFAULT_CHUNK_SIZE};
pub use traits::{ChunkStream, ObjectStore, StoreExt};
pub use types::{ObjectProperties, ObjectRef, VersionToken};
