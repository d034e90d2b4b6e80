//! Read-path benchmarks.
//!
//! `get_config` is the hot path: it must stay non-blocking under concurrent
//! readers and an active background invalidator. These benchmarks compare it
//! against lock-based alternatives and measure scaling with reader count.

use confreg::prelude::*;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use serde::Deserialize;
use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
#[serde(default)]
struct BenchConfig {
    value: i32,
    name: String,
    flag: bool,
    items: Vec<String>,
}

fn bench_registry(runtime: &tokio::runtime::Runtime) -> (ConfigRegistry, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("Bench.conf"),
        r#"{"value":42,"name":"benchmark","flag":true,"items":["a","b","c"]}"#,
    )
    .unwrap();

    let registry = runtime.block_on(async {
        let registry = ConfigRegistry::builder()
            .with_search_path(temp_dir.path())
            .with_file_watch(false)
            .build()
            .await;
        registry
            .add_config::<BenchConfig>("Bench", None, false)
            .await;
        registry
    });
    (registry, temp_dir)
}

/// Benchmark single-threaded cached-read latency
fn benchmark_read_latency(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let (registry, _guard) = bench_registry(&runtime);

    let mut group = c.benchmark_group("read_latency");
    group.bench_function("get_config", |b| {
        b.iter(|| {
            let cfg = registry.get_config::<BenchConfig>("Bench");
            black_box(&cfg.value);
        });
    });
    group.bench_function("get_config_unknown_name", |b| {
        b.iter(|| {
            let cfg = registry.get_config::<BenchConfig>("Absent");
            black_box(&cfg.value);
        });
    });
    group.finish();
}

/// Benchmark concurrent reads with varying thread counts
fn benchmark_concurrent_reads(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("concurrent_reads");

    for num_threads in [1, 2, 4, 8, 16] {
        group.throughput(Throughput::Elements(num_threads as u64 * 1000));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_threads", num_threads)),
            &num_threads,
            |b, &num_threads| {
                let (registry, _guard) = bench_registry(&runtime);
                let registry = Arc::new(registry);
                let barrier = Arc::new(Barrier::new(num_threads + 1));

                b.iter_custom(|iters| {
                    let mut handles = vec![];
                    let start_barrier = Arc::clone(&barrier);

                    for _ in 0..num_threads {
                        let registry = Arc::clone(&registry);
                        let barrier = Arc::clone(&barrier);

                        let handle = thread::spawn(move || {
                            barrier.wait();

                            let start = std::time::Instant::now();
                            for _ in 0..iters {
                                let cfg = registry.get_config::<BenchConfig>("Bench");
                                black_box(&cfg.value);
                            }
                            start.elapsed()
                        });

                        handles.push(handle);
                    }

                    start_barrier.wait();

                    let total_duration: Duration =
                        handles.into_iter().map(|h| h.join().unwrap()).sum();

                    total_duration / num_threads as u32
                });
            },
        );
    }

    group.finish();
}

/// Benchmark comparison with lock-based map approaches
fn benchmark_lock_comparison(c: &mut Criterion) {
    use std::collections::HashMap;
    use std::sync::{Mutex, RwLock};

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("lock_comparison");

    let (registry, _guard) = bench_registry(&runtime);
    group.bench_function("registry_read", |b| {
        b.iter(|| {
            let cfg = registry.get_config::<BenchConfig>("Bench");
            black_box(&cfg.value);
        });
    });

    let mutex_map: Mutex<HashMap<String, Arc<BenchConfig>>> = Mutex::new(HashMap::from([(
        "Bench".to_string(),
        Arc::new(BenchConfig::default()),
    )]));
    group.bench_function("mutex_map_read", |b| {
        b.iter(|| {
            let map = mutex_map.lock().unwrap();
            let cfg = Arc::clone(map.get("Bench").unwrap());
            black_box(&cfg.value);
        });
    });

    let rwlock_map: RwLock<HashMap<String, Arc<BenchConfig>>> = RwLock::new(HashMap::from([(
        "Bench".to_string(),
        Arc::new(BenchConfig::default()),
    )]));
    group.bench_function("rwlock_map_read", |b| {
        b.iter(|| {
            let map = rwlock_map.read().unwrap();
            let cfg = Arc::clone(map.get("Bench").unwrap());
            black_box(&cfg.value);
        });
    });

    group.finish();
}

/// Benchmark reads racing a background invalidate/reload cycle
fn benchmark_read_during_reloads(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("read_during_reloads");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("reads_with_forced_reloads", |b| {
        let (registry, _guard) = bench_registry(&runtime);

        b.iter_custom(|iters| {
            let reader = registry.clone();
            let writer = registry.clone();

            runtime.block_on(async move {
                let reload_task = tokio::spawn(async move {
                    for _ in 0..50 {
                        writer
                            .add_config::<BenchConfig>("Bench", None, true)
                            .await;
                        tokio::time::sleep(Duration::from_micros(100)).await;
                    }
                });

                let start = std::time::Instant::now();
                for _ in 0..iters {
                    let cfg = reader.get_config::<BenchConfig>("Bench");
                    black_box(&cfg.value);
                }
                let duration = start.elapsed();

                reload_task.await.unwrap();
                duration
            })
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_read_latency,
    benchmark_concurrent_reads,
    benchmark_lock_comparison,
    benchmark_read_during_reloads,
);

criterion_main!(benches);
