//! Criterion benchmarks for the orchestrator and the heavier single laws.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lk_common::LawKind;
use lk_config::AnalysisConfig;
use lk_core::{analyze, analyze_law, generate, Dataset, GenerateOptions, LawSelection};

fn dataset(law: LawKind, n: usize) -> Dataset {
    generate(law, &GenerateOptions::new(n).with_seed(17))
        .map(|g| g.dataset)
        .unwrap_or_else(|e| panic!("generate {law}: {e}"))
}

fn bench_analyze_all(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let selection = LawSelection::all();
    let mut group = c.benchmark_group("analyze_all");
    for n in [100usize, 1_000, 10_000] {
        let ds = dataset(LawKind::Poisson, n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &ds, |b, ds| {
            b.iter(|| black_box(analyze(black_box(ds), &selection, &config)));
        });
    }
    group.finish();
}

fn bench_single_laws(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let mut group = c.benchmark_group("single_law");
    for law in LawKind::ALL {
        let ds = dataset(law, 5_000);
        group.bench_with_input(BenchmarkId::from_parameter(law), &ds, |b, ds| {
            b.iter(|| black_box(analyze_law(law, black_box(ds), &config)));
        });
    }
    group.finish();
}

fn bench_rare_event_simulation(c: &mut Criterion) {
    let mut config = AnalysisConfig::default();
    config.poisson.rare_event_mode = true;
    let ds = Dataset::from_values((0..500).map(|i| if i % 40 == 0 { 1.0 } else { 0.0 }));
    c.bench_function("poisson_rare_event", |b| {
        b.iter(|| black_box(analyze_law(LawKind::Poisson, black_box(&ds), &config)));
    });
}

criterion_group!(benches, bench_analyze_all, bench_single_laws, bench_rare_event_simulation);
criterion_main!(benches);
