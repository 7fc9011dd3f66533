//! Cache benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use primdb_cache::{Fingerprint, QueryCache};

fn scan(rows: usize) -> Vec<(i64, String)> {
    (0..rows as i64).map(|i| (i, format!("user{i}"))).collect()
}

fn cache_hit_benchmark(c: &mut Criterion) {
    let cache: QueryCache<Vec<(i64, String)>> = QueryCache::new();
    let key = Fingerprint::unfiltered("users");
    cache.get_or_load(&key, || Ok::<_, ()>(scan(1000))).unwrap();

    c.bench_function("scan_cache_hit_1000_rows", |b| {
        b.iter(|| {
            let rows = cache.get_or_load(&key, || Ok::<_, ()>(scan(1000))).unwrap();
            black_box(rows.len())
        })
    });
}

fn cache_miss_benchmark(c: &mut Criterion) {
    let cache: QueryCache<Vec<(i64, String)>> = QueryCache::new();
    let key = Fingerprint::unfiltered("users");

    c.bench_function("scan_cache_miss_1000_rows", |b| {
        b.iter(|| {
            cache.invalidate_all();
            let rows = cache.get_or_load(&key, || Ok::<_, ()>(scan(1000))).unwrap();
            black_box(rows.len())
        })
    });
}

fn fingerprint_benchmark(c: &mut Criterion) {
    let cache: QueryCache<Vec<(i64, String)>> = QueryCache::new();
    for i in 0..100 {
        let key = Fingerprint::new("users", Some(format!("age={i}")));
        cache.get_or_load(&key, || Ok::<_, ()>(scan(10))).unwrap();
    }

    c.bench_function("scan_cache_lookup_100_fingerprints", |b| {
        b.iter(|| {
            for i in 0..100 {
                let key = Fingerprint::new("users", Some(format!("age={i}")));
                black_box(cache.get(&key));
            }
        })
    });
}

criterion_group!(
    benches,
    cache_hit_benchmark,
    cache_miss_benchmark,
    fingerprint_benchmark
);
criterion_main!(benches);
