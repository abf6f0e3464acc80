//! Host-facing entry point: object-created notifications.
//!
//! The host delivers cloud-event shaped JSON documents. Object-created
//! events run the commit protocol; everything else is logged and skipped.
//! Failures are logged and returned so the host's redelivery retries them.

use std::time::Instant;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use blobhash_store::{ObjectRef, ObjectStore, VersionToken};

use crate::hasher::{BlobHasher, CommitOutcome};

/// Event type announcing a newly created or overwritten object.
pub const OBJECT_CREATED_EVENT: &str = "Microsoft.Storage.BlobCreated";

/// A notification delivered by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Payload of an object-created event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectCreated {
    pub url: String,
    #[serde(rename = "eTag")]
    pub etag: String,
    #[serde(default)]
    pub content_length: Option<u64>,
    #[serde(default)]
    pub blob_type: Option<String>,
}

impl ObjectEvent {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// The object-created payload, or `None` for other event types.
    pub fn as_object_created(&self) -> serde_json::Result<Option<ObjectCreated>> {
        if self.event_type != OBJECT_CREATED_EVENT {
            return Ok(None);
        }
        ObjectCreated::deserialize(&self.data).map(Some)
    }
}

/// What the handler did with an event.
#[derive(Debug)]
pub enum HandleOutcome {
    /// The object was hashed and its checksums committed.
    Hashed(CommitOutcome),
    /// The event was not an object-created event.
    Skipped { event_type: String },
}

/// Runs the commit protocol for each object-created event.
pub struct EventHandler<S: ObjectStore> {
    hasher: BlobHasher<S>,
}

impl<S: ObjectStore> EventHandler<S> {
    pub fn new(hasher: BlobHasher<S>) -> Self {
        Self { hasher }
    }

    pub fn hasher(&self) -> &BlobHasher<S> {
        &self.hasher
    }

    /// Parse and handle a raw JSON event.
    pub async fn handle_json(&self, json: &str) -> anyhow::Result<HandleOutcome> {
        let event = ObjectEvent::from_json(json).context("malformed event payload")?;
        self.handle(&event).await
    }

    /// Handle one event.
    pub async fn handle(&self, event: &ObjectEvent) -> anyhow::Result<HandleOutcome> {
        let created = match event
            .as_object_created()
            .context("malformed object-created event data")?
        {
            Some(created) => created,
            None => {
                warn!(event_type = %event.event_type, "event is not an object-created event");
                return Ok(HandleOutcome::Skipped {
                    event_type: event.event_type.clone(),
                });
            }
        };

        let object = ObjectRef::new(created.url.as_str());
        let token = VersionToken::new(created.etag.as_str());
        let started = Instant::now();

        match self.hasher.run(&object, &token, created.content_length).await {
            Ok(outcome) => {
                info!(
                    %object,
                    length = ?created.content_length,
                    blob_type = ?created.blob_type,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "successfully hashed object"
                );
                Ok(HandleOutcome::Hashed(outcome))
            }
            Err(e) => {
                error!(
                    %object,
                    length = ?created.content_length,
                    blob_type = ?created.blob_type,
                    stage = %e.stage(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "failed to hash object"
                );
                Err(anyhow::Error::new(e).context(format!("failed to hash {object}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_created() {
        let json = r#"{
            "type": "Microsoft.Storage.BlobCreated",
            "subject": "/blobServices/default/containers/uploads/blobs/a.bin",
            "data": {
                "api": "PutBlob",
                "url": "https://account.blob.core.windows.net/uploads/a.bin",
                "eTag": "0x8DC1A2B3C4D5E6F",
                "contentLength": 1024,
                "blobType": "BlockBlob"
            }
        }"#;
        let event = ObjectEvent::from_json(json).unwrap();
        let created = event.as_object_created().unwrap().unwrap();
        assert_eq!(created.url, "https://account.blob.core.windows.net/uploads/a.bin");
        assert_eq!(created.etag, "0x8DC1A2B3C4D5E6F");
        assert_eq!(created.content_length, Some(1024));
        assert_eq!(created.blob_type.as_deref(), Some("BlockBlob"));
    }

    #[test]
    fn test_other_event_types_are_not_created() {
        let event = ObjectEvent::from_json(
            r#"{"type": "Microsoft.Storage.BlobDeleted", "data": {"url": "x"}}"#,
        )
        .unwrap();
        assert_eq!(event.as_object_created().unwrap(), None);
    }

    #[test]
    fn test_created_event_missing_etag_is_malformed() {
        let event = ObjectEvent::from_json(
            r#"{"type": "Microsoft.Storage.BlobCreated", "data": {"url": "x"}}"#,
        )
        .unwrap();
        assert!(event.as_object_created().is_err());
    }
}
