//! Finished digests and their canonical string forms.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::algorithm::{ChecksumAlgorithm, DigestEncoding};
use crate::error::{CoreError, Result};

/// The terminal value produced by one algorithm.
///
/// Cryptographic digests are fixed-size byte arrays; the CRC is the 64-bit
/// value exactly as the algorithm produces it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Digest {
    Md5([u8; 16]),
    Sha256([u8; 32]),
    Crc64Nvme(u64),
}

impl Digest {
    /// The algorithm that produced this digest.
    pub const fn algorithm(&self) -> ChecksumAlgorithm {
        match self {
            Digest::Md5(_) => ChecksumAlgorithm::Md5,
            Digest::Sha256(_) => ChecksumAlgorithm::Sha256,
            Digest::Crc64Nvme(_) => ChecksumAlgorithm::Crc64Nvme,
        }
    }

    /// Raw digest bytes, for byte-oriented digests.
    ///
    /// Returns `None` for the CRC, whose value is a number; see [`Digest::as_u64`].
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Digest::Md5(bytes) => Some(bytes),
            Digest::Sha256(bytes) => Some(bytes),
            Digest::Crc64Nvme(_) => None,
        }
    }

    /// The numeric value, for the CRC.
    pub const fn as_u64(&self) -> Option<u64> {
        match self {
            Digest::Crc64Nvme(value) => Some(*value),
            _ => None,
        }
    }

    /// Render the canonical metadata string for this digest.
    pub fn to_canonical_string(&self) -> String {
        encode(self.algorithm().encoding(), self)
    }

    /// Decode a canonical string produced by [`Digest::to_canonical_string`].
    pub fn parse(algorithm: ChecksumAlgorithm, value: &str) -> Result<Self> {
        let invalid = |reason: String| CoreError::InvalidDigest {
            algorithm,
            value: value.to_string(),
            reason,
        };

        match algorithm {
            ChecksumAlgorithm::Md5 => {
                let bytes = BASE64.decode(value).map_err(|e| invalid(e.to_string()))?;
                let arr: [u8; 16] = bytes
                    .try_into()
                    .map_err(|b: Vec<u8>| invalid(format!("expected 16 bytes, got {}", b.len())))?;
                Ok(Digest::Md5(arr))
            }
            ChecksumAlgorithm::Sha256 => {
                if value.bytes().any(|b| b.is_ascii_uppercase()) {
                    return Err(invalid("hex must be lowercase".into()));
                }
                let bytes = hex::decode(value).map_err(|e| invalid(e.to_string()))?;
                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|b: Vec<u8>| invalid(format!("expected 32 bytes, got {}", b.len())))?;
                Ok(Digest::Sha256(arr))
            }
            ChecksumAlgorithm::Crc64Nvme => {
                let digits = value
                    .strip_prefix("0x")
                    .ok_or_else(|| invalid("missing 0x prefix".into()))?;
                u64::from_str_radix(digits, 16)
                    .map(Digest::Crc64Nvme)
                    .map_err(|e| invalid(e.to_string()))
            }
        }
    }
}

/// Render a digest under an encoding rule.
///
/// The CRC is encoded from its big-endian bytes. `PrefixedHex` reads the
/// bytes as one big-endian number and drops leading zero digits.
fn encode(encoding: DigestEncoding, digest: &Digest) -> String {
    let crc_bytes;
    let bytes: &[u8] = match digest {
        Digest::Md5(bytes) => bytes,
        Digest::Sha256(bytes) => bytes,
        Digest::Crc64Nvme(value) => {
            crc_bytes = value.to_be_bytes();
            &crc_bytes
        }
    };

    match encoding {
        DigestEncoding::Base64 => BASE64.encode(bytes),
        DigestEncoding::LowerHex => hex::encode(bytes),
        DigestEncoding::PrefixedHex => {
            let digits = hex::encode(bytes);
            match digits.trim_start_matches('0') {
                "" => "0x0".to_string(),
                significant => format!("0x{significant}"),
            }
        }
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.algorithm(), self.to_canonical_string())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}
