//! Benchmarks for tag extraction and metric averaging over two years of daily data
//!
//! Run with: cargo bench

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use oura_tags::{AnnotationRecord, Formula, MetricAverager, MetricTable, TagExtractor, WANTED_SCORES};

const LABELS: [&str; 8] = [
    "tag_generic_alcohol",
    "tag_generic_caffeine",
    "tag_generic_late_meal",
    "tag_generic_sauna",
    "tag_generic_travel",
    "headache",
    "felt great",
    "run",
];

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()
}

/// One record every day, cycling through the labels as tags and notes
fn generate_records(days: i64) -> Vec<AnnotationRecord> {
    (0..days)
        .map(|i| {
            let day = start() + Duration::days(i);
            let tag = LABELS[(i as usize) % LABELS.len()];
            let note = if i % 5 == 0 { LABELS[(i as usize * 3) % LABELS.len()] } else { "" };
            AnnotationRecord::new(day, &[tag], note)
        })
        .collect()
}

fn generate_table(days: i64) -> MetricTable {
    let mut table = MetricTable::new();
    for i in 0..days {
        // Leave a gap every few weeks, as when the ring was not worn
        if i % 17 == 0 {
            continue;
        }
        let day = start() + Duration::days(i);
        for (category, metric) in WANTED_SCORES.pairs() {
            let value = 50.0 + ((i * 7 + metric.len() as i64) % 40) as f64;
            table.insert(day, category.column(metric), value);
        }
    }
    table
}

fn benchmark_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("tag_extractor");

    for days in [90, 365, 730].iter() {
        let records = generate_records(*days);
        group.bench_with_input(BenchmarkId::new("extract", days), &records, |b, records| {
            b.iter(|| TagExtractor::extract(black_box(records)))
        });
    }

    group.finish();
}

fn benchmark_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("metric_averager");
    let records = generate_records(730);
    let table = generate_table(730);
    let tag_days = TagExtractor::extract(&records);

    for formula in [Formula::Mean, Formula::Median] {
        let averager = MetricAverager::new(formula);
        group.bench_function(BenchmarkId::new("compute", formula), |b| {
            b.iter(|| averager.compute(black_box(&tag_days), black_box(&table)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_extract, benchmark_compute);
criterion_main!(benches);
