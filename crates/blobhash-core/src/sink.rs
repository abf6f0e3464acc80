//! Streaming hash sink.
//!
//! A [`HashSink`] consumes a byte stream exactly once and feeds every chunk
//! to one incremental hasher per requested algorithm. Nothing is buffered
//! beyond the call a chunk arrives in, so memory use depends on the number of
//! algorithms, not on the size of the object.
//!
//! The sink's lifecycle is explicit:
//!
//! ```text
//! Ready --write(non-empty)--> Accumulating --finalize--> Finalized
//!   \__________________________finalize_____________________/
//! ```
//!
//! Once finalized, every hasher has been consumed and further writes or
//! finalizations fail with [`CoreError::SinkFinalized`].

use std::io;

use md5::Md5;
use sha2::{Digest as _, Sha256};

use crate::algorithm::{AlgorithmSet, ChecksumAlgorithm};
use crate::checksums::ChecksumSet;
use crate::digest::Digest;
use crate::error::{CoreError, Result};

/// Lifecycle state of a [`HashSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    /// Created, no bytes seen yet.
    Ready,
    /// At least one non-empty chunk has been hashed.
    Accumulating,
    /// Digests have been taken; the sink is spent.
    Finalized,
}

/// One optional hasher slot per supported algorithm.
#[derive(Default)]
struct Hashers {
    md5: Option<Md5>,
    sha256: Option<Sha256>,
    crc64nvme: Option<crc64fast_nvme::Digest>,
}

impl Hashers {
    fn for_algorithms(algorithms: AlgorithmSet) -> Self {
        let mut hashers = Hashers::default();
        for algorithm in algorithms.iter() {
            match algorithm {
                ChecksumAlgorithm::Md5 => hashers.md5 = Some(Md5::new()),
                ChecksumAlgorithm::Sha256 => hashers.sha256 = Some(Sha256::new()),
                ChecksumAlgorithm::Crc64Nvme => {
                    hashers.crc64nvme = Some(crc64fast_nvme::Digest::new())
                }
            }
        }
        hashers
    }

    fn update(&mut self, chunk: &[u8]) {
        if let Some(md5) = self.md5.as_mut() {
            md5.update(chunk);
        }
        if let Some(sha256) = self.sha256.as_mut() {
            sha256.update(chunk);
        }
        if let Some(crc) = self.crc64nvme.as_mut() {
            crc.write(chunk);
        }
    }

    /// Take every hasher out of its slot and drain it to a digest.
    fn drain(&mut self) -> Vec<Digest> {
        let mut digests = Vec::with_capacity(3);
        if let Some(md5) = self.md5.take() {
            digests.push(Digest::Md5(md5.finalize().into()));
        }
        if let Some(sha256) = self.sha256.take() {
            digests.push(Digest::Sha256(sha256.finalize().into()));
        }
        if let Some(crc) = self.crc64nvme.take() {
            digests.push(Digest::Crc64Nvme(crc.sum64()));
        }
        digests
    }
}

/// Write-only sink computing several checksums over one pass of a stream.
///
/// Single writer: the sink takes `&mut self` for every operation and is not
/// meant to be shared between threads while hashing.
pub struct HashSink {
    algorithms: AlgorithmSet,
    hashers: Hashers,
    state: SinkState,
    bytes_written: u64,
}

impl HashSink {
    /// Create a sink hashing with the given algorithms.
    pub fn new(algorithms: AlgorithmSet) -> Self {
        Self {
            algorithms,
            hashers: Hashers::for_algorithms(algorithms),
            state: SinkState::Ready,
            bytes_written: 0,
        }
    }

    /// The algorithms this sink was created with.
    pub fn algorithms(&self) -> AlgorithmSet {
        self.algorithms
    }

    pub fn state(&self) -> SinkState {
        self.state
    }

    /// Total bytes fed through the sink so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Hash the next chunk of the stream.
    ///
    /// Zero-length chunks are no-ops.
    pub fn write(&mut self, chunk: &[u8]) -> Result<()> {
        if self.state == SinkState::Finalized {
            return Err(CoreError::SinkFinalized);
        }
        self.absorb(chunk);
        Ok(())
    }

    /// Drain every hasher and return the resulting checksums.
    ///
    /// Succeeds exactly once per sink.
    pub fn finalize(&mut self) -> Result<ChecksumSet> {
        if self.state == SinkState::Finalized {
            return Err(CoreError::SinkFinalized);
        }
        Ok(self.drain())
    }

    fn absorb(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }
        self.hashers.update(chunk);
        self.bytes_written += chunk.len() as u64;
        self.state = SinkState::Accumulating;
    }

    fn drain(&mut self) -> ChecksumSet {
        self.state = SinkState::Finalized;
        let digests = self.hashers.drain();
        ChecksumSet::from_digests(self.algorithms, digests, self.bytes_written)
    }

    /// Consuming variant of [`HashSink::finalize`].
    pub fn into_checksums(mut self) -> Result<ChecksumSet> {
        self.finalize()
    }
}

impl io::Write for HashSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        HashSink::write(self, buf).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for HashSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashSink")
            .field("algorithms", &self.algorithms)
            .field("state", &self.state)
            .field("bytes_written", &self.bytes_written)
            .finish()
    }
}

/// Hash an in-memory buffer with the given algorithms.
pub fn checksums_of(algorithms: AlgorithmSet, data: &[u8]) -> ChecksumSet {
    let mut sink = HashSink::new(algorithms);
    sink.absorb(data);
    sink.drain()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write as _;

    #[test]
    fn test_state_transitions() {
        let mut sink = HashSink::new(AlgorithmSet::all());
        assert_eq!(sink.state(), SinkState::Ready);

        sink.write(b"").unwrap();
        assert_eq!(sink.state(), SinkState::Ready);

        sink.write(b"abc").unwrap();
        assert_eq!(sink.state(), SinkState::Accumulating);

        sink.finalize().unwrap();
        assert_eq!(sink.state(), SinkState::Finalized);
    }

    #[test]
    fn test_finalize_twice_fails() {
        let mut sink = HashSink::new(AlgorithmSet::all());
        sink.write(b"data").unwrap();
        assert!(sink.finalize().is_ok());
        assert_eq!(sink.finalize().unwrap_err(), CoreError::SinkFinalized);
    }

    #[test]
    fn test_write_after_finalize_fails() {
        let mut sink = HashSink::new(AlgorithmSet::all());
        sink.finalize().unwrap();
        assert_eq!(sink.write(b"late").unwrap_err(), CoreError::SinkFinalized);
        assert_eq!(sink.write(b"").unwrap_err(), CoreError::SinkFinalized);
        assert_eq!(sink.bytes_written(), 0);

        let err = io::Write::write(&mut sink, b"late").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }

    #[test]
    fn test_counts_bytes_fed() {
        let mut sink = HashSink::new(AlgorithmSet::single(ChecksumAlgorithm::Sha256));
        sink.write(&[0u8; 10]).unwrap();
        sink.write(&[]).unwrap();
        sink.write(&[1u8; 5]).unwrap();
        assert_eq!(sink.bytes_written(), 15);
        assert_eq!(sink.finalize().unwrap().bytes_hashed(), 15);
    }

    #[test]
    fn test_only_requested_algorithms_present() {
        let set = AlgorithmSet::new([ChecksumAlgorithm::Sha256, ChecksumAlgorithm::Crc64Nvme])
            .unwrap();
        let checksums = checksums_of(set, b"hello world");
        assert!(checksums.get(ChecksumAlgorithm::Md5).is_none());
        assert!(checksums.get(ChecksumAlgorithm::Sha256).is_some());
        assert!(checksums.get(ChecksumAlgorithm::Crc64Nvme).is_some());
    }

    #[test]
    fn test_empty_input_digests() {
        let checksums = checksums_of(AlgorithmSet::all(), b"");
        let metadata = checksums.auxiliary_metadata();
        assert_eq!(metadata["MD5"], "1B2M2Y8AsgTpgAmY7PhCfg==");
        assert_eq!(
            metadata["SHA256"],
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(metadata["CRC64NVME"], "0x0");
    }

    #[test]
    fn test_crc64nvme_check_value() {
        let checksums = checksums_of(AlgorithmSet::single(ChecksumAlgorithm::Crc64Nvme), b"123456789");
        assert_eq!(
            checksums.get(ChecksumAlgorithm::Crc64Nvme).and_then(|d| d.as_u64()),
            Some(0xae8b14860a799888)
        );
    }

    #[test]
    fn test_io_copy_into_sink() {
        let data = vec![7u8; 100_000];
        let mut sink = HashSink::new(AlgorithmSet::all());
        let copied = io::copy(&mut data.as_slice(), &mut sink).unwrap();
        sink.flush().unwrap();
        assert_eq!(copied, 100_000);
        assert_eq!(sink.finalize().unwrap(), checksums_of(AlgorithmSet::all(), &data));
    }

    proptest! {
        #[test]
        fn chunking_does_not_change_digests(
            data in prop::collection::vec(any::<u8>(), 1..4096),
            cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..16),
        ) {
            let mut boundaries: Vec<usize> = cuts.iter().map(|i| i.index(data.len() + 1)).collect();
            boundaries.sort_unstable();

            let mut sink = HashSink::new(AlgorithmSet::all());
            let mut start = 0;
            for end in boundaries {
                sink.write(&data[start..end]).unwrap();
                start = end;
            }
            sink.write(&data[start..]).unwrap();

            let chunked = sink.finalize().unwrap();
            let whole = checksums_of(AlgorithmSet::all(), &data);
            prop_assert_eq!(chunked, whole);
        }
    }
}
