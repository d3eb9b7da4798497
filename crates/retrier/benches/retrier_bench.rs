//! Retrier benchmarks
//!
//! Measures backoff calculation and the retry loop overhead without real
//! sleeps (a mock clock absorbs every delay).
//!
//! Run with: `cargo bench --bench retrier_bench -p retrier`

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use retrier::{Backoff, HandlerScope, MockClock, Retrier, RetryConfig};

// ============================================================================
// Backoff Benchmarks
// ============================================================================

fn bench_backoff_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("backoff_delay");

    let capped = Backoff::exponential_with_max(Duration::from_millis(100), Duration::from_secs(30))
        .expect("valid capped backoff");
    let uncapped = Backoff::exponential(Duration::from_millis(100)).expect("valid backoff");

    for attempt in [1_u32, 8, 40] {
        group.bench_with_input(BenchmarkId::new("capped", attempt), &attempt, |b, &attempt| {
            b.iter(|| black_box(capped.delay(black_box(attempt))));
        });
        group.bench_with_input(BenchmarkId::new("uncapped", attempt), &attempt, |b, &attempt| {
            b.iter(|| black_box(uncapped.delay(black_box(attempt))));
        });
    }

    group.finish();
}

// ============================================================================
// Retry Loop Benchmarks
// ============================================================================

fn bench_retry_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("retry_loop");

    group.bench_function("first_attempt_success", |b| {
        let config = RetryConfig::builder()
            .retry_count(3)
            .timeout(Duration::from_secs(1))
            .build()
            .expect("valid config");
        let retrier = Retrier::new(config).expect("valid retrier");
        b.iter(|| black_box(retrier.execute(|| Ok::<_, ()>(black_box(42)))));
    });

    group.bench_function("exhaust_five_retries", |b| {
        let config = RetryConfig::builder()
            .retry_count(5)
            .exp_backoff(Duration::from_millis(10))
            .handler_scope(HandlerScope::PerCall)
            .build()
            .expect("valid config");
        let clock = MockClock::without_recording();
        let retrier = Retrier::with_clock(config, Arc::new(clock)).expect("valid retrier");
        b.iter(|| black_box(retrier.execute(|| Err::<(), _>(black_box("fail")))));
    });

    group.finish();
}

criterion_group!(benches, bench_backoff_delay, bench_retry_loop);
criterion_main!(benches);
