//! Benches the MODWT kernels (spec §4 C2/C3/C4) across the input sizes the
//! performance model (`perf::model`) buckets into: tiny/small/medium/large.
//! Matches the teacher crate's `criterion`-based `[[bench]]` convention.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use vectorwave::modwt::{decompose, forward_level};
use vectorwave::simd::{BatchSoA, batch_modwt_soa_f64};
use vectorwave::wavelet::WaveletCatalog;
use vectorwave::{Boundary, FilterCache};

fn signal(n: usize) -> Vec<f64> {
    (0..n).map(|i| (i as f64 * 0.01).sin()).collect()
}

fn bench_single_level(c: &mut Criterion) {
    let wavelet = WaveletCatalog::global().get::<f64>("db4").unwrap();
    let cache = FilterCache::new();
    let level_filter = cache.get_or_build(&wavelet, 1).unwrap();
    let mut group = c.benchmark_group("forward_level");
    for &n in &[256usize, 4096, 65536] {
        let data = signal(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| forward_level(data, &level_filter, Boundary::Periodic).unwrap());
        });
    }
    group.finish();
}

fn bench_multilevel(c: &mut Criterion) {
    let wavelet = WaveletCatalog::global().get::<f64>("db4").unwrap();
    let cache = FilterCache::new();
    let mut group = c.benchmark_group("decompose");
    for &n in &[4096usize, 65536] {
        let data = signal(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| decompose(data, &wavelet, 4, Boundary::Periodic, &cache).unwrap());
        });
    }
    group.finish();
}

fn bench_batch_soa(c: &mut Criterion) {
    let wavelet = WaveletCatalog::global().get::<f64>("db4").unwrap();
    let cache = FilterCache::new();
    let level_filter = cache.get_or_build(&wavelet, 1).unwrap();
    let mut group = c.benchmark_group("batch_modwt_soa");
    for &batch in &[4usize, 32, 128] {
        let signals: Vec<Vec<f64>> = (0..batch).map(|k| signal(1024).iter().map(|&x| x + k as f64).collect()).collect();
        let soa = BatchSoA::from_signals(&signals).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(batch), &soa, |b, soa| {
            b.iter(|| batch_modwt_soa_f64(soa, &level_filter, Boundary::Periodic).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_level, bench_multilevel, bench_batch_soa);
criterion_main!(benches);
