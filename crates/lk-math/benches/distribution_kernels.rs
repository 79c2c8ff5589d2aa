//! Criterion benchmarks for `lk-math`.
//!
//! Focus on the kernels every analyzer calls at least once per run.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lk_math::math::shapiro::shapiro_wilk;
use lk_math::{chi_square_quantile, chi_square_sf, normal_quantile};

fn bench_tail_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("tails");

    for (name, x, df) in [
        ("benford_first", 12.4, 8.0),
        ("benford_second", 20.1, 9.0),
        ("last_two", 110.0, 99.0),
    ] {
        group.bench_with_input(BenchmarkId::new("chi_square_sf", name), &(x, df), |b, &(x, df)| {
            b.iter(|| black_box(chi_square_sf(black_box(x), black_box(df))));
        });
        group.bench_with_input(
            BenchmarkId::new("chi_square_quantile", name),
            &df,
            |b, &df| {
                b.iter(|| black_box(chi_square_quantile(black_box(0.975), black_box(df))));
            },
        );
    }

    group.bench_function("normal_quantile", |b| {
        b.iter(|| black_box(normal_quantile(black_box(0.975))));
    });

    group.finish();
}

fn bench_shapiro(c: &mut Criterion) {
    let mut group = c.benchmark_group("shapiro_wilk");
    for n in [50usize, 500, 5000] {
        let data: Vec<f64> = (1..=n)
            .map(|i| normal_quantile((i as f64 - 0.5) / n as f64))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| black_box(shapiro_wilk(black_box(data))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tail_kernels, bench_shapiro);
criterion_main!(benches);
