use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fourfold_core::{ObservedTable, RiskTable};
use fourfold_stats::{
    fisher_exact, odds_ratio, relative_risk, Alternative, AnalysisOptions, ContingencyAnalyzer,
    EffectOptions,
};

fn bench_fisher(c: &mut Criterion) {
    let mut group = c.benchmark_group("fisher_exact");

    let trial = ObservedTable::ascorbic_acid_trial().transpose();
    group.bench_function("trial_less", |b| {
        b.iter(|| fisher_exact(black_box(&trial), Alternative::Less))
    });
    group.bench_function("trial_two_sided", |b| {
        b.iter(|| fisher_exact(black_box(&trial), Alternative::TwoSided))
    });

    // Wide support: ~5k hypergeometric terms
    let large = ObservedTable::new(4_000, 6_000, 5_000, 5_000);
    group.bench_function("20k_two_sided", |b| {
        b.iter(|| fisher_exact(black_box(&large), Alternative::TwoSided))
    });

    group.finish();
}

fn bench_effect_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("effect_size");

    let risk = RiskTable::from_observed(&ObservedTable::ascorbic_acid_trial());
    let opts = EffectOptions::default();
    group.bench_function("relative_risk", |b| {
        b.iter(|| relative_risk(black_box(&risk), &opts))
    });
    group.bench_function("odds_ratio", |b| {
        b.iter(|| odds_ratio(black_box(&risk), &opts))
    });

    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");

    let analyzer = ContingencyAnalyzer::new(AnalysisOptions::default()).unwrap();
    let trial = ObservedTable::ascorbic_acid_trial();
    group.bench_function("trial", |b| {
        b.iter(|| analyzer.analyze(black_box(&trial)))
    });

    group.finish();
}

criterion_group!(benches, bench_fisher, bench_effect_sizes, bench_analyze);
criterion_main!(benches);
