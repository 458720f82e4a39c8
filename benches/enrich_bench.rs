//! Benchmarks for indicator enrichment and rule evaluation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use confluence::features::IndicatorEngine;
use confluence::strategy::{default_evaluators, Findings};
use confluence::types::Candle;

fn generate_candles(count: usize) -> Vec<Candle> {
    let mut candles = Vec::with_capacity(count);
    let mut price = 100.0_f64;

    for i in 0..count {
        let trend = (i as f64 * 0.01).sin() * 10.0;
        let volatility = (i as f64 * 0.1).sin() * 2.0;

        let open = price;
        let close = (open + trend * 0.01 + volatility).max(1.0);
        let high = open.max(close) + volatility.abs() * 0.5;
        let low = open.min(close) - (volatility.abs() * 0.5).max(0.1);

        candles.push(Candle {
            open_time: i as i64 * 60_000,
            open,
            high,
            low,
            close,
            volume: 100.0 + (i % 100) as f64,
        });

        price = close;
    }

    candles
}

fn bench_enrich(c: &mut Criterion) {
    let mut group = c.benchmark_group("enrich");
    let engine = IndicatorEngine::default();

    for size in [100, 500, 1000, 5000].iter() {
        let candles = generate_candles(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &candles, |b, candles| {
            b.iter(|| engine.enrich(black_box(candles)));
        });
    }

    group.finish();
}

fn bench_evaluate_latest(c: &mut Criterion) {
    let rows = IndicatorEngine::default().enrich(&generate_candles(1000));
    let latest = match rows.last() {
        Some(row) => row.clone(),
        None => return,
    };
    let evaluators = default_evaluators();

    c.bench_function("evaluate_latest_row", |b| {
        b.iter(|| {
            let mut findings = Findings::default();
            for evaluator in &evaluators {
                findings.merge(evaluator.evaluate(black_box(&latest)));
            }
            findings
        });
    });
}

criterion_group!(benches, bench_enrich, bench_evaluate_latest);
criterion_main!(benches);
