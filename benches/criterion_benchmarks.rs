use bounded_lru::config::LruCacheConfig;
use bounded_lru::BoundedLruCache;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::num::NonZeroUsize;

fn make_lru<K: std::hash::Hash + Eq + Clone, V: Clone>(cap: usize) -> BoundedLruCache<K, V> {
    let config = LruCacheConfig {
        capacity: NonZeroUsize::new(cap).unwrap(),
    };
    BoundedLruCache::init(config, None)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    const CACHE_SIZE: usize = 1000;
    let mut group = c.benchmark_group("Cache Operations");

    let cache = make_lru(CACHE_SIZE);
    for i in 0..CACHE_SIZE {
        cache.put(i, i);
    }

    group.bench_function("get hit", |b| {
        b.iter(|| {
            for i in 0..100 {
                black_box(cache.get(&(i % CACHE_SIZE)));
            }
        });
    });

    group.bench_function("get miss", |b| {
        b.iter(|| {
            for i in 0..100 {
                black_box(cache.get(&(i + CACHE_SIZE)));
            }
        });
    });

    group.bench_function("contains_key", |b| {
        b.iter(|| {
            for i in 0..100 {
                black_box(cache.contains_key(&(i % CACHE_SIZE)));
            }
        });
    });

    group.bench_function("get_or_evict keep", |b| {
        b.iter(|| {
            for i in 0..100 {
                black_box(cache.get_or_evict(&(i % CACHE_SIZE), |v| *v += 0, |_| false));
            }
        });
    });

    group.bench_function("put existing", |b| {
        b.iter(|| {
            for i in 0..100 {
                black_box(cache.put(i % CACHE_SIZE, i));
            }
        });
    });

    group.bench_function("put with eviction", |b| {
        let churn = make_lru(CACHE_SIZE);
        let mut next = 0usize;
        b.iter(|| {
            for _ in 0..100 {
                black_box(churn.put(next, next));
                next = next.wrapping_add(1);
            }
        });
    });

    group.bench_function("evict on read and refill", |b| {
        let expiring = make_lru(CACHE_SIZE);
        b.iter(|| {
            for i in 0..100 {
                expiring.put(i, i);
            }
            for i in 0..100 {
                black_box(expiring.get_or_evict(&i, |_| {}, |_| true));
            }
        });
    });

    group.bench_function("remove_if sweep", |b| {
        let swept = make_lru(CACHE_SIZE);
        b.iter(|| {
            for i in 0..CACHE_SIZE {
                swept.put(i, i);
            }
            black_box(swept.remove_if(|v| v % 2 == 0));
        });
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
