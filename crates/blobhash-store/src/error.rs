//! Error types for the store module.

use thiserror::Error;

use crate::types::{ObjectRef, VersionToken};

/// Errors that can occur during object store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The object's current version token does not match the condition.
    #[error("precondition failed for {object}: expected {expected}, current {actual}")]
    PreconditionFailed {
        object: ObjectRef,
        expected: VersionToken,
        actual: VersionToken,
    },

    /// Object not found.
    #[error("object not found: {0}")]
    NotFound(ObjectRef),

    /// Transport-level failure talking to the store.
    #[error("transport error: {0}")]
    Transport(String),

    /// I/O error while moving bytes.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether this error reports a version token mismatch.
    pub fn is_precondition_failure(&self) -> bool {
        matches!(self, StoreError::PreconditionFailed { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
