//! Benchmarks for the native bridge against the reference implementation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use logic_bridge::ffi::{Bridge, FfiValue};
use logic_bridge::harness::generate_dataset;
use logic_bridge::{reference, LibraryConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const SIZES: [usize; 4] = [16, 1_024, 65_536, 1_048_576];

/// Loaded artifact if it has been built, else the shim linked in-process
fn bridge() -> Bridge {
    let bridge = Bridge::from_config(&LibraryConfig::default());
    if bridge.is_loaded() {
        bridge
    } else {
        eprintln!(
            "native artifact not found at {}, benchmarking the in-process shim",
            bridge.path().display()
        );
        Bridge::from_function("in-process", logic::count_positives)
    }
}

/// Benchmark bridged and reference counts for varying buffer sizes
fn bench_count_positives(c: &mut Criterion) {
    let bridge = bridge();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut group = c.benchmark_group("count_positives");

    for &size in &SIZES {
        let data = generate_dataset(&mut rng, size, -100, 100);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("native", size), &data, |b, data| {
            b.iter(|| black_box(bridge.count(black_box(data))))
        });

        group.bench_with_input(BenchmarkId::new("reference", size), &data, |b, data| {
            b.iter(|| black_box(reference::count_positives(black_box(data))))
        });
    }

    group.finish();
}

/// Benchmark the type-checked entry point, which copies into an i32 buffer first
fn bench_invoke(c: &mut Criterion) {
    let bridge = bridge();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let values: Vec<FfiValue> = generate_dataset(&mut rng, 65_536, -100, 100)
        .into_iter()
        .map(FfiValue::from)
        .collect();

    let mut group = c.benchmark_group("dynamic_values");
    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("invoke", |b| {
        b.iter(|| black_box(bridge.invoke(black_box(&values))))
    });
    group.bench_function("reference", |b| {
        b.iter(|| black_box(reference::count_positive_values(black_box(&values))))
    });
    group.finish();
}

criterion_group!(benches, bench_count_positives, bench_invoke);
criterion_main!(benches);
