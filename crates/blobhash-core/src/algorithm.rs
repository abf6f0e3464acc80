//! Checksum algorithm registry.
//!
//! The set of supported algorithms is closed: each variant of
//! [`ChecksumAlgorithm`] carries its metadata key, its canonical string
//! encoding, and whether it feeds the object's content-hash header.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// How a digest is rendered into its canonical metadata string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestEncoding {
    /// Standard base64 (with padding) of the raw bytes.
    Base64,
    /// Lowercase hexadecimal of the raw bytes.
    LowerHex,
    /// `0x` followed by the lowercase hex of a 64-bit value, no zero padding.
    PrefixedHex,
}

/// A supported checksum algorithm.
///
/// Variants are declared in canonical order; iteration and metadata layout
/// follow this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChecksumAlgorithm {
    /// 128-bit MD5, the legacy digest placed in the content-hash header.
    #[serde(rename = "MD5")]
    Md5,
    /// 256-bit SHA-2.
    #[serde(rename = "SHA256")]
    Sha256,
    /// CRC-64/NVME.
    #[serde(rename = "CRC64NVME")]
    Crc64Nvme,
}

impl ChecksumAlgorithm {
    /// Every algorithm, in canonical order.
    pub const ALL: [ChecksumAlgorithm; 3] = [
        ChecksumAlgorithm::Md5,
        ChecksumAlgorithm::Sha256,
        ChecksumAlgorithm::Crc64Nvme,
    ];

    /// The algorithm whose digest populates the content-hash header.
    pub const PRIMARY: ChecksumAlgorithm = ChecksumAlgorithm::Md5;

    /// Stable name, also used as the metadata key.
    pub const fn name(self) -> &'static str {
        match self {
            ChecksumAlgorithm::Md5 => "MD5",
            ChecksumAlgorithm::Sha256 => "SHA256",
            ChecksumAlgorithm::Crc64Nvme => "CRC64NVME",
        }
    }

    /// Canonical string encoding for this algorithm's digests.
    pub const fn encoding(self) -> DigestEncoding {
        match self {
            ChecksumAlgorithm::Md5 => DigestEncoding::Base64,
            ChecksumAlgorithm::Sha256 => DigestEncoding::LowerHex,
            ChecksumAlgorithm::Crc64Nvme => DigestEncoding::PrefixedHex,
        }
    }

    /// Length in bytes of the raw digest.
    pub const fn output_len(self) -> usize {
        match self {
            ChecksumAlgorithm::Md5 => 16,
            ChecksumAlgorithm::Sha256 => 32,
            ChecksumAlgorithm::Crc64Nvme => 8,
        }
    }

    /// Whether this algorithm is eligible for the content-hash header.
    pub const fn is_primary(self) -> bool {
        matches!(self, ChecksumAlgorithm::Md5)
    }

    /// Whether this is a cryptographic digest (as opposed to a checksum).
    pub const fn is_cryptographic(self) -> bool {
        !matches!(self, ChecksumAlgorithm::Crc64Nvme)
    }

    const fn bit(self) -> u8 {
        match self {
            ChecksumAlgorithm::Md5 => 1 << 0,
            ChecksumAlgorithm::Sha256 => 1 << 1,
            ChecksumAlgorithm::Crc64Nvme => 1 << 2,
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        ChecksumAlgorithm::ALL
            .into_iter()
            .find(|alg| alg.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CoreError::UnknownAlgorithm(trimmed.to_string()))
    }
}

/// A non-empty set of requested algorithms.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlgorithmSet(u8);

impl AlgorithmSet {
    /// Build a set from the given algorithms. Duplicates are collapsed.
    pub fn new<I>(algorithms: I) -> Result<Self>
    where
        I: IntoIterator<Item = ChecksumAlgorithm>,
    {
        let bits = algorithms.into_iter().fold(0u8, |acc, alg| acc | alg.bit());
        if bits == 0 {
            return Err(CoreError::EmptyAlgorithmSet);
        }
        Ok(Self(bits))
    }

    /// A set holding every supported algorithm.
    pub const fn all() -> Self {
        Self(
            ChecksumAlgorithm::Md5.bit()
                | ChecksumAlgorithm::Sha256.bit()
                | ChecksumAlgorithm::Crc64Nvme.bit(),
        )
    }

    /// A set holding exactly one algorithm.
    pub const fn single(algorithm: ChecksumAlgorithm) -> Self {
        Self(algorithm.bit())
    }

    pub const fn contains(&self, algorithm: ChecksumAlgorithm) -> bool {
        self.0 & algorithm.bit() != 0
    }

    /// Whether the primary algorithm was requested.
    pub const fn includes_primary(&self) -> bool {
        self.contains(ChecksumAlgorithm::PRIMARY)
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Always false: the constructor rejects empty sets.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate the members in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = ChecksumAlgorithm> + '_ {
        ChecksumAlgorithm::ALL
            .into_iter()
            .filter(move |alg| self.contains(*alg))
    }
}

impl Default for AlgorithmSet {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Debug for AlgorithmSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for AlgorithmSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(ChecksumAlgorithm::name).collect();
        f.write_str(&names.join(","))
    }
}

/// Parses a comma-separated list of algorithm names, e.g. `"MD5,SHA256"`.
impl FromStr for AlgorithmSet {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let algorithms = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(ChecksumAlgorithm::from_str)
            .collect::<Result<Vec<_>>>()?;
        Self::new(algorithms)
    }
}

impl Serialize for AlgorithmSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for AlgorithmSet {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let algorithms = Vec::<ChecksumAlgorithm>::deserialize(deserializer)?;
        AlgorithmSet::new(algorithms).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_primary() {
        let primaries: Vec<_> = ChecksumAlgorithm::ALL
            .into_iter()
            .filter(|alg| alg.is_primary())
            .collect();
        assert_eq!(primaries, vec![ChecksumAlgorithm::PRIMARY]);
    }

    #[test]
    fn test_names_are_metadata_keys() {
        assert_eq!(ChecksumAlgorithm::Md5.name(), "MD5");
        assert_eq!(ChecksumAlgorithm::Sha256.name(), "SHA256");
        assert_eq!(ChecksumAlgorithm::Crc64Nvme.name(), "CRC64NVME");
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("md5".parse::<ChecksumAlgorithm>().unwrap(), ChecksumAlgorithm::Md5);
        assert_eq!(
            " Crc64Nvme ".parse::<ChecksumAlgorithm>().unwrap(),
            ChecksumAlgorithm::Crc64Nvme
        );
        assert_eq!(
            "sha1".parse::<ChecksumAlgorithm>(),
            Err(CoreError::UnknownAlgorithm("sha1".into()))
        );
    }

    #[test]
    fn test_empty_set_rejected() {
        assert_eq!(AlgorithmSet::new(std::iter::empty()), Err(CoreError::EmptyAlgorithmSet));
        assert_eq!("".parse::<AlgorithmSet>(), Err(CoreError::EmptyAlgorithmSet));
    }

    #[test]
    fn test_set_iterates_in_canonical_order() {
        let set = AlgorithmSet::new([
            ChecksumAlgorithm::Crc64Nvme,
            ChecksumAlgorithm::Md5,
            ChecksumAlgorithm::Crc64Nvme,
        ])
        .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![ChecksumAlgorithm::Md5, ChecksumAlgorithm::Crc64Nvme]
        );
        assert!(set.includes_primary());
        assert_eq!(set.to_string(), "MD5,CRC64NVME");
    }

    #[test]
    fn test_set_parse_and_serde() {
        let set: AlgorithmSet = "sha256, crc64nvme".parse().unwrap();
        assert!(!set.includes_primary());

        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["SHA256","CRC64NVME"]"#);
        let back: AlgorithmSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);

        assert!(serde_json::from_str::<AlgorithmSet>("[]").is_err());
    }
}
