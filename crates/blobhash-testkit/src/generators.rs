//! Proptest generators for property-based testing.

use proptest::prelude::*;

use blobhash_core::{AlgorithmSet, ChecksumAlgorithm};

/// Generate payload bytes of up to `max_len` bytes.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a ChecksumAlgorithm.
pub fn algorithm() -> impl Strategy<Value = ChecksumAlgorithm> {
    prop_oneof![
        Just(ChecksumAlgorithm::Md5),
        Just(ChecksumAlgorithm::Sha256),
        Just(ChecksumAlgorithm::Crc64Nvme),
    ]
}

/// Generate a non-empty AlgorithmSet.
pub fn algorithm_set() -> impl Strategy<Value = AlgorithmSet> {
    prop::collection::vec(algorithm(), 1..=3)
        .prop_filter_map("non-empty set", |algs| AlgorithmSet::new(algs).ok())
}

/// A payload together with sorted cut points inside it.
#[derive(Debug, Clone)]
pub struct ChunkedPayload {
    pub data: Vec<u8>,
    /// Sorted offsets in `0..=data.len()`; may repeat, producing empty chunks.
    pub cuts: Vec<usize>,
}

impl ChunkedPayload {
    /// The chunks between consecutive cuts, including empty ones.
    pub fn chunks(&self) -> Vec<&[u8]> {
        let mut chunks = Vec::with_capacity(self.cuts.len() + 1);
        let mut start = 0;
        for &end in &self.cuts {
            chunks.push(&self.data[start..end]);
            start = end;
        }
        chunks.push(&self.data[start..]);
        chunks
    }
}

/// Generate a non-empty payload of up to `max_len` bytes split at up to
/// `max_cuts` arbitrary boundaries.
pub fn chunked_payload(max_len: usize, max_cuts: usize) -> impl Strategy<Value = ChunkedPayload> {
    (
        prop::collection::vec(any::<u8>(), 1..=max_len.max(1)),
        prop::collection::vec(any::<prop::sample::Index>(), 0..=max_cuts),
    )
        .prop_map(|(data, indices)| {
            let mut cuts: Vec<usize> = indices.iter().map(|i| i.index(data.len() + 1)).collect();
            cuts.sort_unstable();
            ChunkedPayload { data, cuts }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobhash_core::{checksums_of, HashSink};

    proptest! {
        #[test]
        fn chunks_reassemble_payload(chunked in chunked_payload(512, 8)) {
            let joined: Vec<u8> = chunked.chunks().concat();
            prop_assert_eq!(joined, chunked.data.clone());
        }

        #[test]
        fn any_subset_is_chunking_invariant(
            set in algorithm_set(),
            chunked in chunked_payload(2048, 12),
        ) {
            let mut sink = HashSink::new(set);
            for chunk in chunked.chunks() {
                sink.write(chunk).unwrap();
            }
            let streamed = sink.finalize().unwrap();

            prop_assert_eq!(streamed.len(), set.len());
            prop_assert_eq!(streamed, checksums_of(set, &chunked.data));
        }
    }
}
