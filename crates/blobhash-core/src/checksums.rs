//! The digests computed for one object.

use std::collections::BTreeMap;
use std::fmt;

use crate::algorithm::{AlgorithmSet, ChecksumAlgorithm};
use crate::digest::Digest;
use crate::error::{CoreError, Result};

/// Digests produced by one hashing run, keyed by algorithm.
///
/// Only algorithms that were requested and actually produced a value are
/// present. The set is read-only once built.
#[derive(Clone, PartialEq, Eq)]
pub struct ChecksumSet {
    requested: AlgorithmSet,
    digests: BTreeMap<ChecksumAlgorithm, Digest>,
    bytes_hashed: u64,
}

impl ChecksumSet {
    /// Build a set from finalized digests.
    ///
    /// Digests for algorithms outside `requested` are dropped.
    pub fn from_digests<I>(requested: AlgorithmSet, digests: I, bytes_hashed: u64) -> Self
    where
        I: IntoIterator<Item = Digest>,
    {
        let digests = digests
            .into_iter()
            .filter(|d| requested.contains(d.algorithm()))
            .map(|d| (d.algorithm(), d))
            .collect();
        Self {
            requested,
            digests,
            bytes_hashed,
        }
    }

    /// The algorithms that were asked for.
    pub fn requested(&self) -> AlgorithmSet {
        self.requested
    }

    /// Number of bytes the digests cover.
    pub fn bytes_hashed(&self) -> u64 {
        self.bytes_hashed
    }

    pub fn get(&self, algorithm: ChecksumAlgorithm) -> Option<&Digest> {
        self.digests.get(&algorithm)
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    /// Present digests in canonical algorithm order.
    pub fn iter(&self) -> impl Iterator<Item = &Digest> {
        self.digests.values()
    }

    /// Raw bytes for the content-hash header, if the primary digest is present.
    pub fn primary_header_value(&self) -> Option<&[u8]> {
        self.get(ChecksumAlgorithm::PRIMARY)
            .and_then(Digest::as_bytes)
    }

    /// Like [`ChecksumSet::primary_header_value`], but absence is an error.
    pub fn require_primary(&self) -> Result<&[u8]> {
        self.primary_header_value()
            .ok_or(CoreError::PrimaryDigestMissing(ChecksumAlgorithm::PRIMARY))
    }

    /// Check that every requested algorithm produced a digest.
    ///
    /// A missing primary is reported ahead of any other missing digest.
    pub fn ensure_complete(&self) -> Result<()> {
        if self.requested.includes_primary() {
            self.require_primary()?;
        }
        match self.requested.iter().find(|alg| self.get(*alg).is_none()) {
            Some(missing) => Err(CoreError::DigestMissing(missing)),
            None => Ok(()),
        }
    }

    /// Metadata entries (name -> canonical string) for every present digest,
    /// including the primary one.
    pub fn auxiliary_metadata(&self) -> BTreeMap<String, String> {
        self.digests
            .iter()
            .map(|(alg, digest)| (alg.name().to_string(), digest.to_canonical_string()))
            .collect()
    }
}

impl fmt::Debug for ChecksumSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChecksumSet")
            .field("requested", &self.requested)
            .field("digests", &self.digests.values().collect::<Vec<_>>())
            .field("bytes_hashed", &self.bytes_hashed)
            .finish()
    }
}

/// `MD5=...; SHA256=...; CRC64NVME=...`
impl fmt::Display for ChecksumSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (alg, digest)) in self.digests.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{alg}={digest}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::checksums_of;

    #[test]
    fn test_hello_world_reference_values() {
        let checksums = checksums_of(AlgorithmSet::all(), b"hello world");
        let metadata = checksums.auxiliary_metadata();

        assert_eq!(metadata.len(), 3);
        assert_eq!(metadata["MD5"], "XrY7u+Ae7tCTyyK7j1rNww==");
        assert_eq!(
            metadata["SHA256"],
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert_eq!(metadata["CRC64NVME"], "0x8d29d5c3f6ea8ebe");

        assert_eq!(
            hex::encode(checksums.primary_header_value().unwrap()),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }

    #[test]
    fn test_display_canonical_order() {
        let checksums = checksums_of(AlgorithmSet::all(), b"");
        assert_eq!(
            checksums.to_string(),
            "MD5=1B2M2Y8AsgTpgAmY7PhCfg==; \
             SHA256=e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855; \
             CRC64NVME=0x0"
        );
    }

    #[test]
    fn test_primary_absent_when_not_requested() {
        let set = AlgorithmSet::single(ChecksumAlgorithm::Sha256);
        let checksums = checksums_of(set, b"abc");
        assert_eq!(checksums.primary_header_value(), None);
        assert!(checksums.ensure_complete().is_ok());
        assert_eq!(
            checksums.require_primary(),
            Err(CoreError::PrimaryDigestMissing(ChecksumAlgorithm::Md5))
        );
    }

    #[test]
    fn test_missing_requested_digests_detected() {
        let sha = checksums_of(AlgorithmSet::single(ChecksumAlgorithm::Sha256), b"abc");
        let sha_digest = *sha.get(ChecksumAlgorithm::Sha256).unwrap();

        let partial = ChecksumSet::from_digests(AlgorithmSet::all(), [sha_digest], 3);
        assert_eq!(
            partial.ensure_complete(),
            Err(CoreError::PrimaryDigestMissing(ChecksumAlgorithm::Md5))
        );

        let no_crc = ChecksumSet::from_digests(
            AlgorithmSet::new([ChecksumAlgorithm::Sha256, ChecksumAlgorithm::Crc64Nvme]).unwrap(),
            [sha_digest],
            3,
        );
        assert_eq!(
            no_crc.ensure_complete(),
            Err(CoreError::DigestMissing(ChecksumAlgorithm::Crc64Nvme))
        );
    }

    #[test]
    fn test_unrequested_digests_dropped() {
        let set = AlgorithmSet::single(ChecksumAlgorithm::Crc64Nvme);
        let checksums = ChecksumSet::from_digests(set, [Digest::Md5([0; 16]), Digest::Crc64Nvme(1)], 0);
        assert_eq!(checksums.len(), 1);
        assert!(checksums.get(ChecksumAlgorithm::Md5).is_none());
    }
}
