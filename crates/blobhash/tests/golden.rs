//! Golden vectors run end to end through the commit protocol.
//!
//! For each vector, the object's content-hash header must hold the raw MD5
//! bytes and its metadata must hold exactly the canonical strings.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use blobhash::{BlobHasher, ChecksumAlgorithm, Digest, HashingConfig};
use blobhash_testkit::{all_vectors, TestFixture};

#[tokio::test]
async fn golden_vectors_commit_to_object_properties() {
    for vector in all_vectors() {
        for chunk_size in [1, 3, 64 * 1024] {
            let fixture = TestFixture::new().with_chunk_size(chunk_size);
            let token = fixture.upload(vector.input);

            let hasher = BlobHasher::new(fixture.store.clone(), HashingConfig::default());
            let outcome = hasher
                .run(&fixture.object, &token, Some(vector.input.len() as u64))
                .await
                .unwrap_or_else(|e| panic!("{}: {e}", vector.name));
            assert_eq!(outcome.checksums.bytes_hashed(), vector.input.len() as u64);

            let props = fixture.store.properties(&fixture.object).unwrap();
            assert_eq!(
                props.content_hash.as_deref().map(hex::encode).as_deref(),
                Some(vector.md5_hex),
                "{}: header",
                vector.name
            );
            assert_eq!(props.metadata.len(), 3, "{}", vector.name);
            for algorithm in ChecksumAlgorithm::ALL {
                assert_eq!(
                    props.metadata[algorithm.name()],
                    vector.expected(algorithm),
                    "{}: {algorithm}",
                    vector.name
                );
            }
        }
    }
}

#[test]
fn golden_metadata_decodes_to_raw_digests() {
    for vector in all_vectors() {
        let md5 = Digest::parse(ChecksumAlgorithm::Md5, vector.md5).unwrap();
        assert_eq!(md5.as_bytes().map(hex::encode).as_deref(), Some(vector.md5_hex));
        assert_eq!(BASE64.encode(md5.as_bytes().unwrap()), vector.md5);

        let sha = Digest::parse(ChecksumAlgorithm::Sha256, vector.sha256).unwrap();
        assert_eq!(sha.to_canonical_string(), vector.sha256);

        let crc = Digest::parse(ChecksumAlgorithm::Crc64Nvme, vector.crc64nvme).unwrap();
        assert_eq!(format!("0x{:x}", crc.as_u64().unwrap()), vector.crc64nvme);
    }
}

mod chunking {
    use super::*;
    use blobhash::core::checksums_of;
    use blobhash_testkit::{algorithm_set, payload};
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn store_chunk_size_does_not_change_committed_checksums(
            data in payload(4096),
            chunk_size in 1usize..600,
            algorithms in algorithm_set(),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let fixture = TestFixture::new().with_chunk_size(chunk_size);
            let token = fixture.upload(data.clone());
            let config = HashingConfig {
                algorithms,
                ..HashingConfig::default()
            };
            let hasher = BlobHasher::new(fixture.store.clone(), config);

            let outcome = runtime
                .block_on(hasher.run(&fixture.object, &token, Some(data.len() as u64)))
                .unwrap();
            let expected = checksums_of(algorithms, &data);
            prop_assert_eq!(&outcome.checksums, &expected);

            let props = fixture.store.properties(&fixture.object).unwrap();
            prop_assert_eq!(props.metadata, expected.auxiliary_metadata());
            prop_assert_eq!(
                props.content_hash.as_deref(),
                expected.primary_header_value()
            );
        }
    }
}
