//! Atlas Benchmark Suite
//!
//! Request-path performance targets:
//!   profile_merge_single ............ < 1μs
//!   dominant_selection .............. < 1μs
//!   cache_get_hit_from_200 .......... < 2μs
//!   cache_insert_at_capacity ........ < 5μs

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use atlas_core::aggregate;
use atlas_core::cache::BoundedCache;
use atlas_core::types::EmotionVector;

fn make_vector(i: u32) -> EmotionVector {
    let f = |offset: u32| ((i + offset) % 100) as f32 / 100.0;
    EmotionVector::new(f(0), f(17), f(31), f(53), f(71))
}

/// Benchmark: single profile merge (target: < 1μs).
fn bench_profile_merge(c: &mut Criterion) {
    let existing = make_vector(42);
    let incoming = make_vector(7);

    c.bench_function("profile_merge_single", |b| {
        b.iter(|| {
            let merged = aggregate::merge(
                black_box(&existing),
                black_box(&incoming),
                black_box(137),
            );
            black_box(merged);
        });
    });
}

/// Benchmark: dominant-dimension selection (target: < 1μs).
fn bench_dominant(c: &mut Criterion) {
    let vector = make_vector(42);

    c.bench_function("dominant_selection", |b| {
        b.iter(|| {
            let winner = aggregate::dominant(black_box(&vector));
            black_box(winner);
        });
    });
}

/// Benchmark: cache hit against a populated cache (target: < 2μs).
fn bench_cache_get(c: &mut Criterion) {
    let cache: BoundedCache<EmotionVector> =
        BoundedCache::new(200, Duration::from_secs(300));
    for i in 0..200u32 {
        cache.insert(format!("place-{i}"), make_vector(i));
    }

    c.bench_function("cache_get_hit_from_200", |b| {
        b.iter(|| {
            let hit = cache.get(black_box("place-137"));
            black_box(hit);
        });
    });
}

/// Benchmark: insert into a full cache, forcing one LRU eviction
/// (target: < 5μs).
fn bench_cache_insert(c: &mut Criterion) {
    let cache: BoundedCache<EmotionVector> =
        BoundedCache::new(200, Duration::from_secs(300));
    for i in 0..200u32 {
        cache.insert(format!("place-{i}"), make_vector(i));
    }

    let mut i = 200u32;
    c.bench_function("cache_insert_at_capacity", |b| {
        b.iter(|| {
            cache.insert(format!("place-{i}"), black_box(make_vector(i)));
            i = i.wrapping_add(1);
        });
    });
}

criterion_group!(
    benches,
    bench_profile_merge,
    bench_dominant,
    bench_cache_get,
    bench_cache_insert
);
criterion_main!(benches);
