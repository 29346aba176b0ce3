//! In-memory TTL cache used to memoize store reads.
//!
//! Each cache instance has one time-to-live for all of its entries. Expiry is
//! lazy: an expired entry is only dropped when it is read again. Values are
//! stored as `Arc<V>` so a hit is a reference-count bump and every caller
//! inside the window observes the very same value.
//!
//! [`TtlCache::get_or_try_insert_with`] populates a key at most once at a time
//! (single-flight). Concurrent callers for the same key wait for the running
//! computation and then read its result. Failed computations are not cached.

use std::{
    future::Future,
    hash::Hash,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use dashmap::DashMap;
use tokio::{sync::Mutex, time::Instant};

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    /// Number of entries currently stored (expired ones included until read).
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    /// Number of entries dropped because their TTL elapsed.
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate as a percentage.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

struct CachedEntry<V> {
    value: Arc<V>,
    expires_at: Instant,
}

pub struct TtlCache<K, V> {
    name: &'static str,
    entries: DashMap<K, CachedEntry<V>>,
    in_flight: DashMap<K, Arc<Mutex<()>>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<K: Eq + Hash, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("size", &self.entries.len())
            .finish()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create a new cache. `name` only shows up in logs.
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            entries: DashMap::new(),
            in_flight: DashMap::new(),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the live value for `key`, dropping it first if it expired.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let found = self.lookup(key);
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Stores `value` under `key` with a fresh TTL and returns the shared handle.
    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.entries.insert(
            key,
            CachedEntry {
                value: Arc::clone(&value),
                expires_at: Instant::now() + self.ttl,
            },
        );
        value
    }

    /// Removes `key`; the next read is a miss.
    pub fn invalidate(&self, key: &K) {
        if self.entries.remove(key).is_some() {
            tracing::debug!(cache = self.name, "entry invalidated");
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Returns the cached value or runs `init` to produce it.
    ///
    /// Only one `init` runs per key at a time. Callers that queued behind it
    /// re-check the cache once they get their turn, so they reuse the value it
    /// inserted instead of hitting the store again.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: &K, init: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let gate = self
            .in_flight
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = gate.lock().await;

        let result = match self.lookup(key) {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(value)
            }
            None => init().await.map(|value| self.insert(key.clone(), value)),
        };

        drop(guard);
        // The map holds one handle and `gate` another; any extra handle belongs
        // to a caller still waiting on this key.
        self.in_flight
            .remove_if(key, |_, gate| Arc::strong_count(gate) <= 2);

        result
    }

    fn lookup(&self, key: &K) -> Option<Arc<V>> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Some(Arc::clone(&entry.value));
            }
            drop(entry);
            if self
                .entries
                .remove_if(key, |_, entry| entry.expires_at <= now)
                .is_some()
            {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(cache = self.name, "expired entry dropped");
            }
        }
        None
    }
}
