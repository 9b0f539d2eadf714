//! Benchmarks for bkv storage operations

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use tempfile::TempDir;

use bkv::{Config, Engine, SyncMode};

/// Opens an engine with fsync disabled so the numbers measure the engine
/// rather than the disk.
fn open_bench_engine(dir: &TempDir) -> Engine {
    let config = Config::builder()
        .path(dir.path().join("bench.bkv"))
        .sync_mode(SyncMode::Never)
        .build();
    let mut db = Engine::new(config);
    db.open().unwrap();
    db
}

fn bench_sequential_writes(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let mut db = open_bench_engine(&dir);
    let value = vec![0xAB_u8; 100];

    let mut i = 0u64;
    c.bench_function("set_sequential_100b", |b| {
        b.iter(|| {
            db.set(&format!("key{:08}", i), &value).unwrap();
            i += 1;
        })
    });
}

fn bench_random_reads(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let mut db = open_bench_engine(&dir);
    let value = vec![0xCD_u8; 100];
    for i in 0..1000 {
        db.set(&format!("key{:04}", i), &value).unwrap();
    }

    let mut i = 0u64;
    c.bench_function("get_random_of_1k", |b| {
        b.iter(|| {
            let key = format!("key{:04}", (i * 7919) % 1000);
            i += 1;
            black_box(db.get(&key).unwrap())
        })
    });
}

fn bench_open_replay(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bench.bkv");
    {
        let config = Config::builder()
            .path(&path)
            .sync_mode(SyncMode::Never)
            .build();
        let mut db = Engine::new(config);
        db.open().unwrap();
        let value = vec![0u8; 64];
        for i in 0..10_000 {
            db.set(&format!("key{:05}", i % 2500), &value).unwrap();
        }
        db.close().unwrap();
    }

    c.bench_function("open_replay_10k_records", |b| {
        b.iter(|| {
            let mut db = Engine::open_path(&path).unwrap();
            black_box(db.len());
            db.close().unwrap();
        })
    });
}

fn bench_compact(c: &mut Criterion) {
    c.bench_function("compact_2k_records_half_garbage", |b| {
        b.iter_batched(
            || {
                let dir = TempDir::new().unwrap();
                let mut db = open_bench_engine(&dir);
                let value = vec![0u8; 64];
                for i in 0..2000 {
                    db.set(&format!("key{:04}", i % 1000), &value).unwrap();
                }
                (dir, db)
            },
            |(dir, mut db)| {
                db.compact().unwrap();
                (dir, db)
            },
            BatchSize::PerIteration,
        )
    });
}

criterion_group!(
    benches,
    bench_sequential_writes,
    bench_random_reads,
    bench_open_replay,
    bench_compact
);
criterion_main!(benches);
