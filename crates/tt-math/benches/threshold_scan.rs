//! Criterion benchmarks for `tt-math`.
//!
//! The exact threshold scan is the only non-constant-time kernel.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tt_math::{binomial_tail_probability, significance_threshold};

fn bench_threshold_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("binomial");

    for n in [36_i64, 84, 300, 600] {
        group.bench_with_input(BenchmarkId::new("significance_threshold", n), &n, |b, &n| {
            b.iter(|| black_box(significance_threshold(black_box(n), 0.05, 1.0 / 3.0)));
        });

        group.bench_with_input(BenchmarkId::new("tail_probability", n), &n, |b, &n| {
            b.iter(|| black_box(binomial_tail_probability(black_box(n), n / 2, 1.0 / 3.0)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_threshold_scan);
criterion_main!(benches);
