//! Expiring Entries with Evict-on-Read
//!
//! Stores values with a deadline and lets each read decide whether the
//! entry is still valid. Expired entries are dropped by the read itself, and
//! a periodic sweep clears the ones nobody asks for.
//!
//! Run with: cargo run --example ttl_eviction

use bounded_lru::metrics::CacheMetrics;
use bounded_lru::BoundedLruCache;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
struct Expiring {
    body: String,
    expires_at: Instant,
    reads: u32,
}

impl Expiring {
    fn new(body: impl Into<String>, ttl: Duration) -> Self {
        Self {
            body: body.into(),
            expires_at: Instant::now() + ttl,
            reads: 0,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

fn main() {
    println!("Evict-on-Read Demo");
    println!("==================\n");

    let cache: Arc<BoundedLruCache<String, Expiring>> =
        Arc::new(BoundedLruCache::try_new(4).expect("capacity is non-zero"));

    cache.put("short".into(), Expiring::new("gone soon", Duration::from_millis(50)));
    cache.put("long".into(), Expiring::new("still here", Duration::from_secs(60)));
    cache.put("idle".into(), Expiring::new("never read", Duration::from_millis(50)));

    let read = |key: &str| {
        cache.get_or_evict(key, |e| e.reads += 1, |e| e.is_expired())
    };

    println!("Immediately after insert:");
    for key in ["short", "long"] {
        match read(key) {
            Some(entry) => println!("  {:<6} -> {:?} (reads: {})", key, entry.body, entry.reads),
            None => println!("  {:<6} -> expired", key),
        }
    }

    thread::sleep(Duration::from_millis(80));

    println!("\nAfter 80ms:");
    for key in ["short", "long"] {
        match read(key) {
            Some(entry) => println!("  {:<6} -> {:?} (reads: {})", key, entry.body, entry.reads),
            None => println!("  {:<6} -> expired", key),
        }
    }
    println!("  entries left: {}", cache.len());

    // "idle" was never read, so only a sweep can drop it
    let swept = cache.remove_if(|e| e.is_expired());
    println!("\nSweep removed {} entr{}", swept, if swept == 1 { "y" } else { "ies" });
    println!("  entries left: {}", cache.len());

    println!("\nConcurrent readers:");
    cache.put("shared".into(), Expiring::new("hot", Duration::from_secs(60)));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for _ in 0..100 {
                    cache.get_and_update("shared", |e| e.reads += 1);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("reader panicked");
    }
    let reads = cache.get_with("shared", |e| e.reads).unwrap_or_default();
    println!("  shared read {} times", reads);

    println!("\nMetrics ({}):", cache.algorithm_name());
    for (name, value) in cache.metrics() {
        println!("  {:<20} {:.2}", name, value);
    }
}
