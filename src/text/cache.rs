/*!
 * Bounded memoization for text services.
 *
 * Word splitting and compound marking are called repeatedly on the same
 * strings (once at match time, again during redistribution). This cache
 * keeps the most recently used results and evicts the least recently used
 * entry once capacity is reached.
 */

use std::collections::HashMap;
use std::hash::Hash;

use log::trace;
use parking_lot::Mutex;

struct CacheEntry<V> {
    value: V,
    last_used: u64,
}

struct CacheInner<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    tick: u64,
    hits: usize,
    misses: usize,
    evictions: usize,
}

/// Least-recently-used cache with a fixed capacity
pub struct BoundedCache<K, V> {
    inner: Mutex<CacheInner<K, V>>,
    capacity: usize,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries (0 disables caching)
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::with_capacity(capacity.min(1024)),
                tick: 0,
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
            capacity,
        }
    }

    /// Look up a value, refreshing its recency on hit
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        inner.tick += 1;
        let tick = inner.tick;

        let hit = inner.entries.get_mut(key).map(|entry| {
            entry.last_used = tick;
            entry.value.clone()
        });

        if hit.is_some() {
            inner.hits += 1;
        } else {
            inner.misses += 1;
        }
        hit
    }

    /// Store a value, evicting the least recently used entry when full
    pub fn store(&self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        let mut inner = self.inner.lock();
        inner.tick += 1;
        let tick = inner.tick;

        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.capacity {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                inner.entries.remove(&oldest);
                inner.evictions += 1;
                trace!("Cache full ({} entries), evicted least recently used", self.capacity);
            }
        }

        inner.entries.insert(key, CacheEntry { value, last_used: tick });
    }

    /// Return the cached value or compute and store it
    pub fn get_or_insert_with<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = compute();
        self.store(key, value.clone());
        value
    }

    /// Get cache statistics as (hits, misses, hit rate)
    pub fn stats(&self) -> (usize, usize, f64) {
        let inner = self.inner.lock();
        let total = inner.hits + inner.misses;
        let hit_rate = if total > 0 {
            inner.hits as f64 / total as f64
        } else {
            0.0
        };
        (inner.hits, inner.misses, hit_rate)
    }

    /// Number of entries evicted so far
    pub fn evictions(&self) -> usize {
        self.inner.lock().evictions
    }

    /// Clear the cache and its counters
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.hits = 0;
        inner.misses = 0;
        inner.evictions = 0;
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
