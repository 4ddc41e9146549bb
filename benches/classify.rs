//! Benchmarks for the ranking and splitting path

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use momentum_lab::classifier::{rank_and_split, SplitMode, TimeUnit, VelocityMethod};
use momentum_lab::entity::{ActivitySeries, Entity};

fn population(size: usize) -> Vec<Entity> {
    let base = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
    (0..size)
        .map(|i| {
            let days = (i % 90 + 1) as i64;
            let series = ActivitySeries::from_pairs(vec![
                (base, 1),
                (base + Duration::days(days), 100),
            ]);
            Entity::new(format!("entity-{i:05}"), series)
                .with_outcome("outcome", (i * 13 % 997) as f64)
        })
        .collect()
}

fn benchmark_percentile_split(c: &mut Criterion) {
    let entities = population(10_000);
    let method = VelocityMethod::TimeToThreshold {
        threshold: 100,
        unit: TimeUnit::Days,
    };
    let mode = SplitMode::Percentile { percent: 20.0 };

    c.bench_function("percentile_split_10k", |b| {
        b.iter(|| rank_and_split(black_box(&entities), &method, "outcome", &mode))
    });
}

fn benchmark_fixed_threshold_split(c: &mut Criterion) {
    let entities = population(10_000);
    let method = VelocityMethod::TimeToThreshold {
        threshold: 100,
        unit: TimeUnit::Days,
    };
    let mode = SplitMode::FixedThreshold {
        fast_min: 20.0,
        slow_max: 100.0 / 30.0,
    };

    c.bench_function("fixed_threshold_split_10k", |b| {
        b.iter(|| rank_and_split(black_box(&entities), &method, "outcome", &mode))
    });
}

criterion_group!(
    benches,
    benchmark_percentile_split,
    benchmark_fixed_threshold_split
);
criterion_main!(benches);
