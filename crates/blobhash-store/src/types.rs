//! Identifiers and property types exchanged with an object store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Reference to one object in a store, typically its URL.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectRef(String);

impl ObjectRef {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({})", self.0)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Opaque entity tag describing one state of an object's bytes and metadata.
///
/// Tokens are only ever compared for equality, never parsed.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Mint a fresh token for the given generation of an object.
    ///
    /// Distinct (object, generation) pairs yield distinct tokens.
    pub fn mint(object: &ObjectRef, generation: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"blobhash-version-v0:");
        hasher.update(object.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(&generation.to_be_bytes());
        let hash = hasher.finalize();

        let mut tag = [0u8; 8];
        tag.copy_from_slice(&hash.as_bytes()[..8]);
        Self(format!("\"0x{:016X}\"", u64::from_be_bytes(tag)))
    }
}

impl fmt::Debug for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VersionToken({})", self.0)
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A snapshot of an object's properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectProperties {
    pub version_token: VersionToken,
    pub content_length: u64,
    /// Raw bytes of the standard content-hash header, if set.
    pub content_hash: Option<Vec<u8>>,
    pub metadata: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_is_deterministic_and_distinct() {
        let object = ObjectRef::new("mem://container/a.bin");
        assert_eq!(VersionToken::mint(&object, 1), VersionToken::mint(&object, 1));
        assert_ne!(VersionToken::mint(&object, 1), VersionToken::mint(&object, 2));

        let other = ObjectRef::new("mem://container/b.bin");
        assert_ne!(VersionToken::mint(&object, 1), VersionToken::mint(&other, 1));
    }

    #[test]
    fn test_minted_token_looks_like_etag() {
        let token = VersionToken::mint(&ObjectRef::new("x"), 7);
        let s = token.as_str();
        assert!(s.starts_with("\"0x") && s.ends_with('"'));
        assert_eq!(s.len(), 2 + 2 + 16);
    }
}
