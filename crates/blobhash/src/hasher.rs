//! The conditional commit protocol.
//!
//! One run hashes one object and commits its checksums:
//!
//! ```text
//! RESOLVE_TOKEN -> STREAM_AND_HASH -> FINALIZE -> WRITE_HEADERS -> WRITE_METADATA
//! ```
//!
//! The store has no single "set headers and metadata" call, so the two
//! writes are chained: the metadata write is conditioned on the token the
//! header write returned. A failure before WRITE_HEADERS leaves the object
//! untouched. A failure at WRITE_METADATA leaves the header set without the
//! metadata; re-running the job for unchanged bytes rewrites both.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use blobhash_core::{ChecksumSet, HashSink};
use blobhash_store::{ObjectRef, ObjectStore, VersionToken};

use crate::config::{HashingConfig, TokenPolicy};
use crate::error::{JobError, Result, Stage};

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    /// The object that was hashed.
    pub object: ObjectRef,
    /// The token the download and first write were conditioned on.
    pub resolved_token: VersionToken,
    /// The token returned by the header write, if one was made.
    pub header_token: Option<VersionToken>,
    /// The object's token after the last write.
    pub final_token: VersionToken,
    /// The computed checksums.
    pub checksums: ChecksumSet,
    /// Number of conditional writes issued.
    pub writes: usize,
}

/// Hashes objects and commits their checksums onto the object's properties.
///
/// Holds no per-run state; one instance serves any number of runs, on any
/// number of objects, concurrently.
pub struct BlobHasher<S: ObjectStore> {
    store: Arc<S>,
    config: HashingConfig,
}

impl<S: ObjectStore> BlobHasher<S> {
    /// Create a hasher over the given store.
    pub fn new(store: S, config: HashingConfig) -> Self {
        Self::from_shared(Arc::new(store), config)
    }

    /// Create a hasher over a store shared with other components.
    pub fn from_shared(store: Arc<S>, config: HashingConfig) -> Self {
        Self { store, config }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &HashingConfig {
        &self.config
    }

    /// Run the protocol for one object.
    ///
    /// `delivered_token` is the version token that came with the triggering
    /// notification; `content_length`, when known, is only compared against
    /// the number of bytes hashed.
    pub async fn run(
        &self,
        object: &ObjectRef,
        delivered_token: &VersionToken,
        content_length: Option<u64>,
    ) -> Result<CommitOutcome> {
        info!(
            %object,
            token = %delivered_token,
            length = ?content_length,
            algorithms = %self.config.algorithms,
            "hashing object"
        );

        let token = self.resolve_token(object, delivered_token).await?;
        let checksums = self.stream_and_hash(object, &token).await?;

        if let Some(expected) = content_length {
            if expected != checksums.bytes_hashed() {
                warn!(
                    %object,
                    expected,
                    hashed = checksums.bytes_hashed(),
                    "hashed length differs from delivered content length"
                );
            }
        }

        checksums
            .ensure_complete()
            .map_err(|e| JobError::from_core(object, e))?;

        let metadata = checksums.auxiliary_metadata();
        info!(%object, checksums = %checksums, "computed checksums");

        let mut writes = 0;
        let header_token = match checksums.primary_header_value() {
            Some(content_hash) => {
                let new_token = self.write_headers(object, content_hash, &token).await?;
                writes += 1;
                Some(new_token)
            }
            None => {
                debug!(%object, "primary checksum not requested, skipping header write");
                None
            }
        };

        // Chain off the header write's token: that write advanced the version.
        let metadata_condition = header_token.as_ref().unwrap_or(&token);
        let final_token = self
            .write_metadata(object, &metadata, metadata_condition, header_token.is_some())
            .await?;
        writes += 1;

        Ok(CommitOutcome {
            object: object.clone(),
            resolved_token: token,
            header_token,
            final_token,
            checksums,
            writes,
        })
    }

    /// RESOLVE_TOKEN: choose the token every later step is conditioned on.
    async fn resolve_token(
        &self,
        object: &ObjectRef,
        delivered_token: &VersionToken,
    ) -> Result<VersionToken> {
        match self.config.token_policy {
            TokenPolicy::Strict => Ok(delivered_token.clone()),
            TokenPolicy::RefreshLive => {
                let live = self
                    .store
                    .version_token(object)
                    .await
                    .map_err(|e| JobError::from_store(object, Stage::ResolveToken, e))?;
                if &live != delivered_token {
                    debug!(%object, delivered = %delivered_token, %live, "using live version token");
                }
                Ok(live)
            }
        }
    }

    /// STREAM_AND_HASH and FINALIZE: pipe the conditioned download through a sink.
    async fn stream_and_hash(&self, object: &ObjectRef, token: &VersionToken) -> Result<ChecksumSet> {
        let stage_err = |e| JobError::from_store(object, Stage::StreamAndHash, e);

        let mut sink = HashSink::new(self.config.algorithms);
        let mut stream = self.store.download(object, token).await.map_err(stage_err)?;
        while let Some(chunk) = stream.next_chunk().await.map_err(stage_err)? {
            sink.write(&chunk).map_err(|e| JobError::from_core(object, e))?;
        }
        debug!(%object, bytes = sink.bytes_written(), "download complete");

        sink.finalize().map_err(|e| JobError::from_core(object, e))
    }

    /// WRITE_HEADERS: set the content-hash header under the resolved token.
    async fn write_headers(
        &self,
        object: &ObjectRef,
        content_hash: &[u8],
        condition: &VersionToken,
    ) -> Result<VersionToken> {
        let new_token = self
            .store
            .set_content_hash(object, content_hash, condition)
            .await
            .map_err(|e| JobError::from_store(object, Stage::WriteHeaders, e))?;
        debug!(%object, %condition, token = %new_token, "content hash header written");
        Ok(new_token)
    }

    /// WRITE_METADATA: set the checksum metadata under the header write's token.
    async fn write_metadata(
        &self,
        object: &ObjectRef,
        metadata: &BTreeMap<String, String>,
        condition: &VersionToken,
        header_written: bool,
    ) -> Result<VersionToken> {
        let new_token = self
            .store
            .set_metadata(object, metadata, condition)
            .await
            .map_err(|e| JobError::from_metadata_write(object, header_written, e))?;
        debug!(%object, %condition, token = %new_token, "checksum metadata written");
        Ok(new_token)
    }
}
