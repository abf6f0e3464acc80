//! In-memory implementation of the ObjectStore trait.
//!
//! Keeps objects in memory with real conditional-write semantics: every
//! write mints a new version token, and every conditioned call compares the
//! caller's token with the current one. It also records each conditional
//! write and can inject one-shot failures, which the protocol tests rely on.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::traits::{ChunkStream, ObjectStore};
use crate::types::{ObjectProperties, ObjectRef, VersionToken};

/// Default size of the chunks handed out by downloads.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Store operations, used to target failure injection and in the write log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    VersionToken,
    Download,
    SetContentHash,
    SetMetadata,
}

/// One conditional write as seen by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub object: ObjectRef,
    pub op: StoreOp,
    /// The token the caller conditioned the write on.
    pub condition: VersionToken,
    /// The token returned, or `None` if the write was rejected.
    pub result: Option<VersionToken>,
}

/// In-memory object store.
///
/// Cloning yields another handle to the same objects.
#[derive(Clone)]
pub struct MemoryObjectStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
    chunk_size: usize,
}

struct MemoryStoreInner {
    objects: HashMap<ObjectRef, StoredObject>,

    /// Monotonic across the store, so tokens are never reused.
    next_generation: u64,

    write_log: Vec<WriteRecord>,

    /// One-shot failures keyed by the operation they hit.
    failures: HashMap<StoreOp, String>,
}

struct StoredObject {
    content: Bytes,
    content_hash: Option<Vec<u8>>,
    metadata: BTreeMap<String, String>,
    token: VersionToken,
}

impl MemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryStoreInner {
                objects: HashMap::new(),
                next_generation: 1,
                write_log: Vec::new(),
                failures: HashMap::new(),
            })),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Use `chunk_size`-byte chunks for downloads (minimum 1).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Upload an object, replacing any previous object at the same reference.
    ///
    /// Headers and metadata are reset, as for a fresh upload.
    pub fn put_object(&self, object: &ObjectRef, content: impl Into<Bytes>) -> VersionToken {
        let mut inner = self.write();
        let token = inner.mint(object);
        inner.objects.insert(
            object.clone(),
            StoredObject {
                content: content.into(),
                content_hash: None,
                metadata: BTreeMap::new(),
                token: token.clone(),
            },
        );
        debug!(%object, %token, "object uploaded");
        token
    }

    /// Simulate a foreign writer updating the object's metadata.
    ///
    /// Sets `key` to `value` unconditionally and advances the version token.
    pub fn touch(&self, object: &ObjectRef, key: &str, value: &str) -> Result<VersionToken> {
        let mut inner = self.write();
        let token = inner.mint(object);
        let stored = inner
            .objects
            .get_mut(object)
            .ok_or_else(|| StoreError::NotFound(object.clone()))?;
        stored.metadata.insert(key.to_string(), value.to_string());
        stored.token = token.clone();
        Ok(token)
    }

    /// Current properties of an object.
    pub fn properties(&self, object: &ObjectRef) -> Result<ObjectProperties> {
        let inner = self.read();
        let stored = inner
            .objects
            .get(object)
            .ok_or_else(|| StoreError::NotFound(object.clone()))?;
        Ok(ObjectProperties {
            version_token: stored.token.clone(),
            content_length: stored.content.len() as u64,
            content_hash: stored.content_hash.clone(),
            metadata: stored.metadata.clone(),
        })
    }

    /// Every conditional write attempted so far, in order.
    pub fn write_log(&self) -> Vec<WriteRecord> {
        self.read().write_log.clone()
    }

    /// Make the next call of `op` fail with a transport error.
    pub fn fail_next(&self, op: StoreOp, message: impl Into<String>) {
        self.write().failures.insert(op, message.into());
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryStoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryStoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a conditional write, logging the attempt.
    fn conditional_write<F>(
        &self,
        op: StoreOp,
        object: &ObjectRef,
        condition: &VersionToken,
        apply: F,
    ) -> Result<VersionToken>
    where
        F: FnOnce(&mut StoredObject),
    {
        let mut inner = self.write();
        inner.take_failure(op)?;

        let checked = inner.check_condition(object, condition);
        let result = match checked {
            Ok(()) => {
                let token = inner.mint(object);
                if let Some(stored) = inner.objects.get_mut(object) {
                    apply(stored);
                    stored.token = token.clone();
                }
                Ok(token)
            }
            Err(e) => Err(e),
        };

        inner.write_log.push(WriteRecord {
            object: object.clone(),
            op,
            condition: condition.clone(),
            result: result.as_ref().ok().cloned(),
        });

        match &result {
            Ok(token) => debug!(%object, ?op, %condition, %token, "conditional write applied"),
            Err(e) => debug!(%object, ?op, %condition, error = %e, "conditional write rejected"),
        }
        result
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStoreInner {
    fn mint(&mut self, object: &ObjectRef) -> VersionToken {
        let generation = self.next_generation;
        self.next_generation += 1;
        VersionToken::mint(object, generation)
    }

    fn take_failure(&mut self, op: StoreOp) -> Result<()> {
        match self.failures.remove(&op) {
            Some(message) => Err(StoreError::Transport(message)),
            None => Ok(()),
        }
    }

    fn check_condition(&self, object: &ObjectRef, condition: &VersionToken) -> Result<()> {
        let stored = self
            .objects
            .get(object)
            .ok_or_else(|| StoreError::NotFound(object.clone()))?;
        if &stored.token != condition {
            return Err(StoreError::PreconditionFailed {
                object: object.clone(),
                expected: condition.clone(),
                actual: stored.token.clone(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn version_token(&self, object: &ObjectRef) -> Result<VersionToken> {
        let mut inner = self.write();
        inner.take_failure(StoreOp::VersionToken)?;
        inner
            .objects
            .get(object)
            .map(|stored| stored.token.clone())
            .ok_or_else(|| StoreError::NotFound(object.clone()))
    }

    async fn download(
        &self,
        object: &ObjectRef,
        condition: &VersionToken,
    ) -> Result<Box<dyn ChunkStream>> {
        let mut inner = self.write();
        inner.take_failure(StoreOp::Download)?;
        inner.check_condition(object, condition)?;

        let content = inner
            .objects
            .get(object)
            .map(|stored| stored.content.clone())
            .ok_or_else(|| StoreError::NotFound(object.clone()))?;

        Ok(Box::new(MemoryChunkStream {
            inner: Arc::clone(&self.inner),
            object: object.clone(),
            condition: condition.clone(),
            content,
            offset: 0,
            chunk_size: self.chunk_size,
        }))
    }

    async fn set_content_hash(
        &self,
        object: &ObjectRef,
        content_hash: &[u8],
        condition: &VersionToken,
    ) -> Result<VersionToken> {
        self.conditional_write(StoreOp::SetContentHash, object, condition, |stored| {
            stored.content_hash = Some(content_hash.to_vec());
        })
    }

    async fn set_metadata(
        &self,
        object: &ObjectRef,
        metadata: &BTreeMap<String, String>,
        condition: &VersionToken,
    ) -> Result<VersionToken> {
        self.conditional_write(StoreOp::SetMetadata, object, condition, |stored| {
            stored.metadata = metadata.clone();
        })
    }
}

/// Download stream over a snapshot of an object's bytes.
///
/// Re-checks the version condition before handing out each chunk.
struct MemoryChunkStream {
    inner: Arc<RwLock<MemoryStoreInner>>,
    object: ObjectRef,
    condition: VersionToken,
    content: Bytes,
    offset: usize,
    chunk_size: usize,
}

#[async_trait]
impl ChunkStream for MemoryChunkStream {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .check_condition(&self.object, &self.condition)?;

        if self.offset >= self.content.len() {
            return Ok(None);
        }
        let end = (self.offset + self.chunk_size).min(self.content.len());
        let chunk = self.content.slice(self.offset..end);
        self.offset = end;
        Ok(Some(chunk))
    }
}
