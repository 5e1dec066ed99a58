//! A benchmark for the predictive codec.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use predictor::{compress, decompress, Context};

fn bench_compress(c: &mut Criterion) {
    let input: Vec<u8> = (0..4096).map(|i| [0, 0, 0, 255][i % 4]).collect();

    c.bench_function("compress_patterned_4k", |b| {
        b.iter(|| {
            let artifact =
                compress(black_box(&input), Context::default()).unwrap();
            black_box(artifact.len());
        })
    });

    let artifact = compress(&input, Context::default()).unwrap();
    c.bench_function("decompress_patterned_4k", |b| {
        b.iter(|| {
            let decoded =
                decompress(black_box(&artifact), Context::default()).unwrap();
            black_box(decoded.len());
        })
    });
}

criterion_group!(benches, bench_compress);
criterion_main!(benches);
