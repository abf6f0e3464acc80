//! Error types for hashing jobs.

use std::fmt;

use blobhash_core::{ChecksumAlgorithm, CoreError};
use blobhash_store::{ObjectRef, StoreError};
use thiserror::Error;

/// A stage of the commit protocol, reported with every failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ResolveToken,
    StreamAndHash,
    Finalize,
    WriteHeaders,
    WriteMetadata,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::ResolveToken => "RESOLVE_TOKEN",
            Stage::StreamAndHash => "STREAM_AND_HASH",
            Stage::Finalize => "FINALIZE",
            Stage::WriteHeaders => "WRITE_HEADERS",
            Stage::WriteMetadata => "WRITE_METADATA",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that abort one hashing run.
///
/// No variant is retried inside the run; the host's redelivery decides.
#[derive(Debug, Error)]
pub enum JobError {
    /// The object's version token no longer matched.
    #[error("precondition conflict on {object} at {stage}: {source}")]
    PreconditionConflict {
        object: ObjectRef,
        stage: Stage,
        /// Whether this run had already written the content-hash header.
        header_written: bool,
        source: StoreError,
    },

    /// The primary algorithm was requested but produced no digest.
    #[error("primary checksum {algorithm} missing for {object}")]
    PrimaryDigestMissing {
        object: ObjectRef,
        algorithm: ChecksumAlgorithm,
    },

    /// A non-primary requested algorithm produced no digest.
    #[error("checksum {algorithm} missing for {object}")]
    DigestMissing {
        object: ObjectRef,
        algorithm: ChecksumAlgorithm,
    },

    /// Any other store failure, surfaced unchanged.
    #[error("store failure on {object} at {stage}: {source}")]
    Transport {
        object: ObjectRef,
        stage: Stage,
        /// Whether this run had already written the content-hash header.
        header_written: bool,
        source: StoreError,
    },

    /// The hash sink refused an operation.
    #[error("hash sink failure on {object}: {source}")]
    Sink { object: ObjectRef, source: CoreError },
}

impl JobError {
    /// Classify a store error raised at `stage`, before any write landed.
    pub(crate) fn from_store(object: &ObjectRef, stage: Stage, source: StoreError) -> Self {
        Self::classify(object, stage, false, source)
    }

    /// Classify a failed metadata write.
    pub(crate) fn from_metadata_write(
        object: &ObjectRef,
        header_written: bool,
        source: StoreError,
    ) -> Self {
        Self::classify(object, Stage::WriteMetadata, header_written, source)
    }

    fn classify(object: &ObjectRef, stage: Stage, header_written: bool, source: StoreError) -> Self {
        if source.is_precondition_failure() {
            JobError::PreconditionConflict {
                object: object.clone(),
                stage,
                header_written,
                source,
            }
        } else {
            JobError::Transport {
                object: object.clone(),
                stage,
                header_written,
                source,
            }
        }
    }

    /// Map a checksum-set check onto the job's error taxonomy.
    pub(crate) fn from_core(object: &ObjectRef, source: CoreError) -> Self {
        match source {
            CoreError::PrimaryDigestMissing(algorithm) => JobError::PrimaryDigestMissing {
                object: object.clone(),
                algorithm,
            },
            CoreError::DigestMissing(algorithm) => JobError::DigestMissing {
                object: object.clone(),
                algorithm,
            },
            source => JobError::Sink {
                object: object.clone(),
                source,
            },
        }
    }

    /// The object the failed run was hashing.
    pub fn object(&self) -> &ObjectRef {
        match self {
            JobError::PreconditionConflict { object, .. }
            | JobError::PrimaryDigestMissing { object, .. }
            | JobError::DigestMissing { object, .. }
            | JobError::Transport { object, .. }
            | JobError::Sink { object, .. } => object,
        }
    }

    /// The protocol stage the run reached.
    pub fn stage(&self) -> Stage {
        match self {
            JobError::PreconditionConflict { stage, .. } | JobError::Transport { stage, .. } => {
                *stage
            }
            JobError::PrimaryDigestMissing { .. }
            | JobError::DigestMissing { .. }
            | JobError::Sink { .. } => Stage::Finalize,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, JobError::PreconditionConflict { .. })
    }

    /// Whether the content-hash header was durably written before the failure.
    ///
    /// Only a metadata write that follows a successful header write can leave
    /// this state. Re-running the job for unchanged bytes resolves it.
    pub fn is_partial_commit(&self) -> bool {
        match self {
            JobError::PreconditionConflict { header_written, .. }
            | JobError::Transport { header_written, .. } => *header_written,
            _ => false,
        }
    }
}

/// Errors loading a [`HashingConfig`](crate::HashingConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {source}")]
    InvalidValue {
        key: &'static str,
        source: CoreError,
    },

    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for hashing jobs.
pub type Result<T> = std::result::Result<T, JobError>;
