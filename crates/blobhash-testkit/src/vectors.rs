//! Golden checksum vectors.
//!
//! Reference digests for fixed inputs, in the canonical metadata encoding.
//! Every implementation must reproduce these exactly.

use blobhash_core::{checksums_of, AlgorithmSet, ChecksumAlgorithm};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct ChecksumVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Input bytes.
    pub input: &'static [u8],
    /// MD5, hex of the raw header bytes.
    pub md5_hex: &'static str,
    /// MD5 metadata value (base64).
    pub md5: &'static str,
    /// SHA256 metadata value (lowercase hex).
    pub sha256: &'static str,
    /// CRC64NVME metadata value (`0x` hex).
    pub crc64nvme: &'static str,
}

impl ChecksumVector {
    /// Expected metadata value for one algorithm.
    pub fn expected(&self, algorithm: ChecksumAlgorithm) -> &'static str {
        match algorithm {
            ChecksumAlgorithm::Md5 => self.md5,
            ChecksumAlgorithm::Sha256 => self.sha256,
            ChecksumAlgorithm::Crc64Nvme => self.crc64nvme,
        }
    }
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<ChecksumVector> {
    vec![
        ChecksumVector {
            name: "empty input",
            input: b"",
            md5_hex: "d41d8cd98f00b204e9800998ecf8427e",
            md5: "1B2M2Y8AsgTpgAmY7PhCfg==",
            sha256: "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
            crc64nvme: "0x0",
        },
        ChecksumVector {
            name: "hello world",
            input: b"hello world",
            md5_hex: "5eb63bbbe01eeed093cb22bb8f5acdc3",
            md5: "XrY7u+Ae7tCTyyK7j1rNww==",
            sha256: "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9",
            crc64nvme: "0x8d29d5c3f6ea8ebe",
        },
        ChecksumVector {
            name: "CRC check input",
            input: b"123456789",
            md5_hex: "25f9e794323b453885f5181f1b624d0b",
            md5: "JfnnlDI7RTiF9RgfG2JNCw==",
            sha256: "15e2b0d3c33891ebb0f1ef609ec419420c20e320ce94c65fbc8c3312448eb225",
            crc64nvme: "0xae8b14860a799888",
        },
        ChecksumVector {
            name: "pangram",
            input: b"The quick brown fox jumps over the lazy dog",
            md5_hex: "9e107d9d372bb6826bd81d3542a419d6",
            md5: "nhB9nTcrtoJr2B01QqQZ1g==",
            sha256: "d7a8fbb307d7809469ca9abcb0082e4f8d5651e46d3cdb762d02d0bf37c9e592",
            crc64nvme: "0xd76c54054954c143",
        },
    ]
}

/// Check one vector against the sink, returning a description of any mismatch.
pub fn verify_vector(vector: &ChecksumVector) -> Result<(), String> {
    let checksums = checksums_of(AlgorithmSet::all(), vector.input);
    let metadata = checksums.auxiliary_metadata();

    for algorithm in ChecksumAlgorithm::ALL {
        let actual = metadata.get(algorithm.name()).map(String::as_str);
        let expected = vector.expected(algorithm);
        if actual != Some(expected) {
            return Err(format!(
                "{}: {} expected {}, got {:?}",
                vector.name, algorithm, expected, actual
            ));
        }
    }

    let header = checksums.primary_header_value().map(hex::encode);
    if header.as_deref() != Some(vector.md5_hex) {
        return Err(format!(
            "{}: header expected {}, got {:?}",
            vector.name, vector.md5_hex, header
        ));
    }
    Ok(())
}

/// Verify every golden vector, collecting all mismatches.
pub fn verify_all_vectors() -> Result<(), Vec<String>> {
    let failures: Vec<String> = all_vectors()
        .iter()
        .filter_map(|v| verify_vector(v).err())
        .collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_verify() {
        if let Err(failures) = verify_all_vectors() {
            panic!("golden vector mismatches:\n{}", failures.join("\n"));
        }
    }

    #[test]
    fn test_vector_names_unique() {
        let vectors = all_vectors();
        let mut names: Vec<_> = vectors.iter().map(|v| v.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), vectors.len());
    }
}
