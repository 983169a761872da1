//! Throughput benchmarks for flowgate
//!
//! Measures items per second for various scenarios:
//! - Emission with standing unbounded credit
//! - Emission paced by per-item requests
//! - Buffered emission released in batches
//! - Overflow policy comparison under saturation
//! - Async channel receiver and tokio bridge

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use flowgate::testing::TestSubscriber;
use flowgate::{
    Bridge, BridgeConfig, FnSubscriber, OverflowConfig, Subscription, TokioExecutor, channel,
    subscribe,
};
use std::sync::Arc;
use std::time::Duration;

fn counting_subscriber() -> FnSubscriber<u64> {
    FnSubscriber::new(|item: u64, _: &Subscription| {
        black_box(item);
    })
}

fn bench_unbounded_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("unbounded_emit");
    group.throughput(Throughput::Elements(1));
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("emit_with_standing_credit", |b| {
        let subscriber = counting_subscriber().with_initial_request(u64::MAX);
        let producer = subscribe(OverflowConfig::error(), subscriber).unwrap();
        let mut next = 0u64;
        b.iter(|| {
            next += 1;
            black_box(producer.emit(next).unwrap());
        });
    });

    group.finish();
}

fn bench_paced_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("paced_emit");
    group.throughput(Throughput::Elements(1));
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("request_one_per_item", |b| {
        let subscriber = FnSubscriber::new(|item: u64, subscription: &Subscription| {
            black_box(item);
            subscription.request(1);
        })
        .with_initial_request(1);
        let producer = subscribe(OverflowConfig::error(), subscriber).unwrap();
        let mut next = 0u64;
        b.iter(|| {
            next += 1;
            black_box(producer.emit(next).unwrap());
        });
    });

    group.finish();
}

fn bench_buffered_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffered_release");

    for batch_size in [16u64, 128, 1024].iter() {
        group.throughput(Throughput::Elements(*batch_size));
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            batch_size,
            |b, &batch_size| {
                b.iter(|| {
                    let subscriber = TestSubscriber::new();
                    let recorder = subscriber.recorder();
                    let producer =
                        subscribe(OverflowConfig::buffer(batch_size as usize), subscriber)
                            .unwrap();
                    for item in 0..batch_size {
                        producer.emit(item).unwrap();
                    }
                    recorder.request(batch_size);
                    black_box(recorder.item_count());
                });
            },
        );
    }

    group.finish();
}

fn bench_policies_saturated(c: &mut Criterion) {
    let mut group = c.benchmark_group("policies_saturated");
    group.throughput(Throughput::Elements(1024));

    let policies = [
        ("drop_newest", OverflowConfig::drop_newest(64)),
        ("drop_oldest", OverflowConfig::drop_oldest(64)),
        ("latest", OverflowConfig::latest()),
    ];

    for (name, config) in policies {
        group.bench_function(name, |b| {
            b.iter(|| {
                let producer = subscribe(config, counting_subscriber()).unwrap();
                for item in 0..1024u64 {
                    black_box(producer.emit(item).unwrap());
                }
            });
        });
    }

    group.finish();
}

fn bench_channel_receiver(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel_receiver");
    group.throughput(Throughput::Elements(1000));
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("recv_1000_batch_64", |b| {
        let rt = tokio::runtime::Runtime::new().unwrap();

        b.to_async(&rt).iter(|| async {
            let (producer, mut receiver) = channel(OverflowConfig::buffer(1024), 64).unwrap();

            tokio::spawn(async move {
                for item in 0..1000u64 {
                    producer.emit(item).unwrap();
                }
                producer.complete().unwrap();
            });

            while let Some(item) = receiver.recv().await {
                black_box(item.unwrap());
            }
        });
    });

    group.finish();
}

fn bench_tokio_bridge(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokio_bridge");
    group.throughput(Throughput::Elements(1000));
    group.measurement_time(Duration::from_secs(10));

    for prefetch in [16usize, 128].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(prefetch),
            prefetch,
            |b, &prefetch| {
                let rt = tokio::runtime::Runtime::new().unwrap();

                b.to_async(&rt).iter(|| async move {
                    let subscriber = TestSubscriber::unbounded();
                    let recorder = subscriber.recorder();
                    let bridge = Bridge::new(
                        BridgeConfig::new(prefetch),
                        Arc::new(TokioExecutor::current()),
                        OverflowConfig::buffer(prefetch),
                        subscriber,
                    )
                    .unwrap();
                    let producer = subscribe(OverflowConfig::unbounded(), bridge).unwrap();

                    for item in 0..1000u64 {
                        producer.emit(item).unwrap();
                    }
                    producer.complete().unwrap();

                    assert!(recorder.await_terminal(Duration::from_secs(10)).await);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_unbounded_emit,
    bench_paced_emit,
    bench_buffered_release,
    bench_policies_saturated,
    bench_channel_receiver,
    bench_tokio_bridge
);
criterion_main!(benches);
