use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use blobhash_core::{AlgorithmSet, ChecksumAlgorithm, HashSink};

const OBJECT_SIZE: usize = 4 * 1024 * 1024;

fn hash_in_chunks(algorithms: AlgorithmSet, data: &[u8], chunk_size: usize) {
    let mut sink = HashSink::new(algorithms);
    for chunk in data.chunks(chunk_size) {
        sink.write(chunk).unwrap();
    }
    criterion::black_box(sink.finalize().unwrap());
}

fn bench_sink(c: &mut Criterion) {
    let data = vec![0x5au8; OBJECT_SIZE];
    let mut group = c.benchmark_group("hash_sink");
    group.throughput(Throughput::Bytes(OBJECT_SIZE as u64));

    let sets = [
        ("all", AlgorithmSet::all()),
        ("md5", AlgorithmSet::single(ChecksumAlgorithm::Md5)),
        ("sha256", AlgorithmSet::single(ChecksumAlgorithm::Sha256)),
        ("crc64nvme", AlgorithmSet::single(ChecksumAlgorithm::Crc64Nvme)),
    ];
    for (name, set) in sets {
        group.bench_with_input(BenchmarkId::new(name, "64KiB"), &data, |b, data| {
            b.iter(|| hash_in_chunks(set, data, 64 * 1024))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sink);
criterion_main!(benches);
