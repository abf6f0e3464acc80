//! Store traits: the abstract interface to the object store.
//!
//! The hashing protocol only needs four operations on one object: read its
//! current version token, download its bytes under a version condition, and
//! two conditional property writes. Implementations include the in-memory
//! store (for tests and local runs); production backends live with the host.

use std::collections::BTreeMap;
use std::future::Future;
use std::io;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::types::{ObjectRef, VersionToken};

/// A pull-based stream of object bytes.
///
/// Chunks arrive in object order. A stream opened under a version condition
/// fails with [`StoreError::PreconditionFailed`](crate::StoreError) if the
/// object changes while it is being read.
#[async_trait]
pub trait ChunkStream: Send {
    /// The next chunk, or `None` at end of object.
    async fn next_chunk(&mut self) -> Result<Option<Bytes>>;
}

/// The ObjectStore trait: conditional access to single objects.
///
/// Every mutating call takes the version token the caller expects the object
/// to have and returns the token the object has after the write. A call whose
/// condition does not match is rejected without side effects.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Get the object's current version token.
    async fn version_token(&self, object: &ObjectRef) -> Result<VersionToken>;

    /// Open a download of the object, conditioned on `condition`.
    async fn download(
        &self,
        object: &ObjectRef,
        condition: &VersionToken,
    ) -> Result<Box<dyn ChunkStream>>;

    /// Set the standard content-hash header to the raw `content_hash` bytes.
    ///
    /// # Returns
    /// The object's new version token.
    async fn set_content_hash(
        &self,
        object: &ObjectRef,
        content_hash: &[u8],
        condition: &VersionToken,
    ) -> Result<VersionToken>;

    /// Replace the object's user metadata.
    ///
    /// # Returns
    /// The object's new version token.
    async fn set_metadata(
        &self,
        object: &ObjectRef,
        metadata: &BTreeMap<String, String>,
        condition: &VersionToken,
    ) -> Result<VersionToken>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: ObjectStore {
    /// Download the object under `condition` and copy every chunk into `writer`.
    ///
    /// Returns the number of bytes copied.
    fn download_to<W>(
        &self,
        object: &ObjectRef,
        condition: &VersionToken,
        writer: &mut W,
    ) -> impl Future<Output = Result<u64>> + Send
    where
        W: io::Write + Send;
}

impl<S: ObjectStore + ?Sized> StoreExt for S {
    async fn download_to<W>(
        &self,
        object: &ObjectRef,
        condition: &VersionToken,
        writer: &mut W,
    ) -> Result<u64>
    where
        W: io::Write + Send,
    {
        let mut stream = self.download(object, condition).await?;
        let mut copied = 0u64;
        while let Some(chunk) = stream.next_chunk().await? {
            writer.write_all(&chunk)?;
            copied += chunk.len() as u64;
        }
        writer.flush()?;
        Ok(copied)
    }
}
