use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use form_throttle::{
    Evaluator, InMemoryStatePersistence, InMemorySubmissionStore, LayeredConfigSource,
    LimiterConfig, LimiterState, Resource, ResourceSettings, SubmissionRateLimiter,
};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Benchmark a single evaluation against stores of different sizes
fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let config = LimiterConfig::new(1_000_000, Duration::from_secs(60));
    let now = SystemTime::now();

    for history in [10usize, 1_000, 100_000].iter() {
        let store = Arc::new(InMemorySubmissionStore::new());
        let form = Resource::new("contact", "Contact");
        for i in 0..*history {
            store.record(&form.id, now - Duration::from_millis(i as u64));
        }
        let evaluator = Evaluator::new(store);
        let state = LimiterState::enabled();

        group.bench_with_input(BenchmarkId::from_parameter(history), history, |b, _| {
            b.iter(|| {
                evaluator
                    .evaluate(black_box(&form.id), &config, &state, black_box(now))
                    .unwrap()
            })
        });
    }

    group.finish();
}

/// Benchmark the full submission path through the limiter
fn bench_record_submission(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_submission");
    group.throughput(Throughput::Elements(1));

    let store = Arc::new(InMemorySubmissionStore::new());
    let config = LayeredConfigSource::builder()
        .with_override("contact", ResourceSettings::new().with_threshold(u64::MAX))
        .build()
        .unwrap();
    let limiter = SubmissionRateLimiter::builder()
        .with_store(store.clone())
        .with_persistence(Arc::new(InMemoryStatePersistence::new()))
        .with_config_source(Arc::new(config))
        .build()
        .unwrap();
    let form = Resource::new("contact", "Contact");
    for _ in 0..100 {
        store.record(&form.id, SystemTime::now());
    }

    group.bench_function("untripped", |b| {
        b.iter(|| limiter.record_submission(black_box(&form)).unwrap())
    });

    let inert = Resource::new("inert", "Inert");
    let inert_limiter = SubmissionRateLimiter::builder()
        .with_store(store.clone())
        .with_persistence(Arc::new(InMemoryStatePersistence::new()))
        .with_config_source(Arc::new(
            LayeredConfigSource::builder()
                .with_override("inert", ResourceSettings::new().with_threshold(0))
                .build()
                .unwrap(),
        ))
        .build()
        .unwrap();

    group.bench_function("inert", |b| {
        b.iter(|| inert_limiter.record_submission(black_box(&inert)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_record_submission);
criterion_main!(benches);
