//! Error types for blobhash core.

use thiserror::Error;

use crate::algorithm::ChecksumAlgorithm;

/// Errors that can occur while selecting algorithms, hashing, or decoding digests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("algorithm set must not be empty")]
    EmptyAlgorithmSet,

    #[error("unknown checksum algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("hash sink already finalized")]
    SinkFinalized,

    #[error("primary checksum {0} was requested but not produced")]
    PrimaryDigestMissing(ChecksumAlgorithm),

    #[error("checksum {0} was requested but not produced")]
    DigestMissing(ChecksumAlgorithm),

    #[error("invalid {algorithm} digest {value:?}: {reason}")]
    InvalidDigest {
        algorithm: ChecksumAlgorithm,
        value: String,
        reason: String,
    },
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
