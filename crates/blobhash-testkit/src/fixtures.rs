//! Test fixtures and helpers.
//!
//! Common setup code for protocol tests.

use bytes::Bytes;
use rand::RngCore;

use blobhash_store::{MemoryObjectStore, ObjectRef, StoreExt, VersionToken};

/// A test fixture with an in-memory store and one object reference.
pub struct TestFixture {
    pub store: MemoryObjectStore,
    pub object: ObjectRef,
}

impl TestFixture {
    /// Create a new fixture with default download chunking.
    pub fn new() -> Self {
        Self::named("mem://fixtures/object.bin")
    }

    /// Create a fixture for a specific object reference.
    pub fn named(object: &str) -> Self {
        Self {
            store: MemoryObjectStore::new(),
            object: ObjectRef::new(object),
        }
    }

    /// Use `chunk_size`-byte chunks for downloads.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.store = self.store.with_chunk_size(chunk_size);
        self
    }

    /// Upload `content` as the fixture's object.
    pub fn upload(&self, content: impl Into<Bytes>) -> VersionToken {
        self.store.put_object(&self.object, content)
    }

    /// Upload `len` random bytes, returning them with the object's token.
    pub fn upload_random(&self, len: usize) -> (Vec<u8>, VersionToken) {
        let mut content = vec![0u8; len];
        rand::thread_rng().fill_bytes(&mut content);
        let token = self.upload(content.clone());
        (content, token)
    }

    /// Simulate another writer updating the object.
    pub fn foreign_write(&self) -> VersionToken {
        self.store
            .touch(&self.object, "x-foreign-writer", "1")
            .unwrap_or_else(|e| panic!("fixture object missing: {e}"))
    }

    /// Download the object's current bytes.
    pub async fn read_back(&self) -> Vec<u8> {
        let props = self
            .store
            .properties(&self.object)
            .unwrap_or_else(|e| panic!("fixture object missing: {e}"));
        let mut out = Vec::new();
        self.store
            .download_to(&self.object, &props.version_token, &mut out)
            .await
            .unwrap_or_else(|e| panic!("fixture download failed: {e}"));
        out
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create fixtures for `count` distinct objects sharing one store.
pub fn shared_store_fixtures(count: usize) -> Vec<TestFixture> {
    let store = MemoryObjectStore::new();
    (0..count)
        .map(|i| TestFixture {
            store: store.clone(),
            object: ObjectRef::new(format!("mem://fixtures/object-{i}.bin")),
        })
        .collect()
}
