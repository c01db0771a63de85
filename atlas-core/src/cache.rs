//! Bounded key→value cache with per-entry TTL and strict LRU eviction.
//!
//! Shields the rest of the system from redundant work against slow or
//! costly collaborators (the generative upstream, the profile store).
//! Entries decay passively: expiry is detected lazily at access time, so
//! there is no background sweep and staleness is bounded by the TTL.
//!
//! One coarse lock per cache instance. Every operation is O(1) and holds
//! the lock only for the map operation itself — cache calls never suspend.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::trace;

/// A cached value with its expiry and creation instants.
///
/// Owned exclusively by the cache; lookups hand out clones, never
/// references into the map.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
    created_at: Instant,
}

struct CacheInner<V> {
    entries: LruCache<String, CacheEntry<V>>,
    default_ttl: Duration,
    hits: u64,
    misses: u64,
}

/// Point-in-time counters for one cache instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    /// Live entry count (including not-yet-collected expired entries).
    pub size: usize,
    /// Maximum entry count.
    pub capacity: usize,
    /// Lookups that returned a live value.
    pub hits: u64,
    /// Lookups that found nothing, or only an expired entry.
    pub misses: u64,
    /// hits / (hits + misses), or 0 before any lookup.
    pub hit_rate: f64,
}

/// Generic bounded cache: fixed capacity, per-entry TTL, strict LRU.
///
/// `get`/`contains` refresh recency; inserting a new key at capacity
/// evicts the single least-recently-used entry. A capacity-one cache is
/// valid and is the supported idiom for singleton snapshots.
pub struct BoundedCache<V> {
    inner: Mutex<CacheInner<V>>,
}

impl<V: Clone> BoundedCache<V> {
    /// Create a cache holding at most `capacity` entries (0 coerces to 1),
    /// with `default_ttl` applied to entries inserted without an explicit
    /// TTL.
    #[must_use]
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(CacheInner {
                entries: LruCache::new(capacity),
                default_ttl,
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Look up a key, promoting it to most-recently-used on a hit.
    ///
    /// An expired entry is treated as absent: it is removed and the lookup
    /// counts as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.lock();
        if Self::evict_if_expired(&mut inner, key) {
            inner.misses += 1;
            return None;
        }
        let found = inner.entries.get(key).map(|e| e.value.clone());
        match found {
            Some(value) => {
                inner.hits += 1;
                Some(value)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Whether a live entry exists for `key`.
    ///
    /// Promotes recency like [`get`](Self::get) and lazily removes an
    /// expired entry, but does not move the hit/miss counters — hit rate
    /// stays a measure of value retrieval.
    pub fn contains(&self, key: &str) -> bool {
        let mut inner = self.inner.lock();
        if Self::evict_if_expired(&mut inner, key) {
            return false;
        }
        inner.entries.get(key).is_some()
    }

    /// Insert with the cache-level default TTL.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        let mut inner = self.inner.lock();
        let ttl = inner.default_ttl;
        Self::put(&mut inner, key.into(), value, ttl);
    }

    /// Insert with an explicit per-entry TTL.
    pub fn insert_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let mut inner = self.inner.lock();
        Self::put(&mut inner, key.into(), value, ttl);
    }

    /// Remove a key. Returns whether an entry (live or expired) existed.
    pub fn remove(&self, key: &str) -> bool {
        self.inner.lock().entries.pop(key).is_some()
    }

    /// Drop every entry and reset the hit/miss counters.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.hits = 0;
        inner.misses = 0;
    }

    /// Current entry count.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Maximum entry count.
    pub fn capacity(&self) -> usize {
        self.inner.lock().entries.cap().get()
    }

    /// Snapshot the counters.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let lookups = inner.hits + inner.misses;
        #[allow(clippy::cast_precision_loss)]
        let hit_rate = if lookups == 0 {
            0.0
        } else {
            inner.hits as f64 / lookups as f64
        };
        CacheStats {
            size: inner.entries.len(),
            capacity: inner.entries.cap().get(),
            hits: inner.hits,
            misses: inner.misses,
            hit_rate,
        }
    }

    /// Return the cached value for `key`, or invoke `supplier` exactly once,
    /// store its result, and return it.
    ///
    /// The supplier runs under the cache lock and must not access this
    /// cache.
    pub fn get_or_insert_with(
        &self,
        key: &str,
        ttl: Option<Duration>,
        supplier: impl FnOnce() -> V,
    ) -> V {
        let mut inner = self.inner.lock();
        Self::evict_if_expired(&mut inner, key);
        if let Some(value) = inner.entries.get(key).map(|e| e.value.clone()) {
            inner.hits += 1;
            return value;
        }
        inner.misses += 1;
        let value = supplier();
        let ttl = ttl.unwrap_or(inner.default_ttl);
        Self::put(&mut inner, key.to_string(), value.clone(), ttl);
        value
    }

    /// Async [`get_or_insert_with`](Self::get_or_insert_with): the supplier
    /// runs without the lock held, its failure propagates to the caller,
    /// and nothing is cached on failure.
    ///
    /// Concurrent callers missing on the same key may each invoke their own
    /// supplier; the last completed write wins.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        supplier: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = supplier().await?;
        let mut inner = self.inner.lock();
        let ttl = ttl.unwrap_or(inner.default_ttl);
        Self::put(&mut inner, key.to_string(), value.clone(), ttl);
        Ok(value)
    }

    /// Age of the live entry for `key`, if any. Diagnostic only.
    pub fn entry_age(&self, key: &str) -> Option<Duration> {
        let inner = self.inner.lock();
        inner
            .entries
            .peek(key)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.created_at.elapsed())
    }

    /// Remove `key` if its entry has expired. Returns whether it did.
    fn evict_if_expired(inner: &mut CacheInner<V>, key: &str) -> bool {
        let expired = inner
            .entries
            .peek(key)
            .is_some_and(|e| e.expires_at <= Instant::now());
        if expired {
            inner.entries.pop(key);
            trace!(key, "expired cache entry dropped");
        }
        expired
    }

    /// Store an entry. `LruCache::put` replaces and promotes an existing
    /// key, and evicts the LRU entry when a new key lands at capacity.
    fn put(inner: &mut CacheInner<V>, key: String, value: V, ttl: Duration) {
        let now = Instant::now();
        inner.entries.put(
            key,
            CacheEntry {
                value,
                expires_at: now + ttl,
                created_at: now,
            },
        );
    }
}

// ---------------------------------------------------------------------------
// Registry — named caches for diagnostics
// ---------------------------------------------------------------------------

/// Anything that can report [`CacheStats`]. Implemented by
/// [`BoundedCache`] for any value type, which lets heterogeneous caches
/// share one registry.
pub trait CacheStatsSource: Send + Sync {
    /// Snapshot the counters.
    fn stats(&self) -> CacheStats;
}

impl<V: Clone + Send> CacheStatsSource for BoundedCache<V> {
    fn stats(&self) -> CacheStats {
        BoundedCache::stats(self)
    }
}

/// Stats for one named cache instance.
#[derive(Debug, Clone, Serialize)]
pub struct NamedCacheStats {
    /// Registry name of the cache.
    pub name: String,
    /// Its counters.
    pub stats: CacheStats,
}

/// Registry of named caches, queried by the diagnostics surface.
#[derive(Default)]
pub struct CacheRegistry {
    caches: dashmap::DashMap<String, Arc<dyn CacheStatsSource>>,
}

impl CacheRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cache under `name`, replacing any previous holder.
    pub fn register(&self, name: impl Into<String>, cache: Arc<dyn CacheStatsSource>) {
        self.caches.insert(name.into(), cache);
    }

    /// Snapshot every registered cache, sorted by name.
    pub fn snapshot(&self) -> Vec<NamedCacheStats> {
        let mut out: Vec<NamedCacheStats> = self
            .caches
            .iter()
            .map(|entry| NamedCacheStats {
                name: entry.key().clone(),
                stats: entry.value().stats(),
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> BoundedCache<u32> {
        BoundedCache::new(capacity, Duration::from_secs(60))
    }

    #[test]
    fn lru_evicts_oldest_unaccessed_key() {
        let c = cache(3);
        c.insert("a", 1);
        c.insert("b", 2);
        c.insert("c", 3);
        c.insert("d", 4); // capacity + 1

        assert!(c.get("a").is_none(), "first-inserted key should be evicted");
        assert_eq!(c.get("d"), Some(4));
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn accessed_key_outlives_unaccessed_peer() {
        let c = cache(3);
        c.insert("a", 1);
        c.insert("b", 2);
        c.insert("c", 3);

        assert_eq!(c.get("a"), Some(1)); // promote
        c.insert("d", 4); // evicts b, the LRU

        assert_eq!(c.get("a"), Some(1));
        assert!(c.get("b").is_none());
    }

    #[test]
    fn reinsert_refreshes_recency_without_evicting() {
        let c = cache(2);
        c.insert("a", 1);
        c.insert("b", 2);
        c.insert("a", 10); // existing key: replace + promote, no eviction

        assert_eq!(c.get("b"), Some(2));
        assert_eq!(c.get("a"), Some(10));
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn ttl_expiry_is_lazy() {
        let c = cache(4);
        c.insert_with_ttl("short", 1, Duration::from_millis(1));
        c.insert_with_ttl("long", 2, Duration::from_secs(3600));

        std::thread::sleep(Duration::from_millis(20));

        assert!(c.get("short").is_none());
        assert_eq!(c.get("long"), Some(2));
    }

    #[test]
    fn expired_entry_counts_as_miss() {
        let c = cache(4);
        c.insert_with_ttl("k", 1, Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(20));

        assert!(c.get("k").is_none());
        let stats = c.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.size, 0, "expired entry should be removed");
    }

    #[test]
    fn stats_track_hit_rate() {
        let c = cache(4);
        c.insert("a", 1);

        c.get("a");
        c.get("a");
        c.get("missing");

        let stats = c.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn clear_resets_counters() {
        let c = cache(4);
        c.insert("a", 1);
        c.get("a");
        c.get("missing");

        c.clear();

        let stats = c.stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert!((stats.hit_rate - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn contains_promotes_but_does_not_count() {
        let c = cache(2);
        c.insert("a", 1);
        c.insert("b", 2);

        assert!(c.contains("a")); // promote a
        c.insert("c", 3); // evicts b

        assert!(c.get("b").is_none());
        assert_eq!(c.get("a"), Some(1));
        // the contains call itself moved no counters
        assert_eq!(c.stats().misses, 1); // only the get("b") miss
    }

    #[test]
    fn capacity_one_cache_holds_a_singleton() {
        let c = cache(1);
        c.insert("snapshot", 1);
        assert_eq!(c.get("snapshot"), Some(1));

        c.insert("snapshot", 2);
        assert_eq!(c.get("snapshot"), Some(2));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn zero_capacity_coerces_to_one() {
        let c = cache(0);
        c.insert("k", 1);
        assert_eq!(c.capacity(), 1);
        assert_eq!(c.get("k"), Some(1));
    }

    #[test]
    fn get_or_insert_with_computes_once() {
        let c = cache(4);
        let mut calls = 0;

        let v1 = c.get_or_insert_with("k", None, || {
            calls += 1;
            42
        });
        let v2 = c.get_or_insert_with("k", None, || {
            calls += 1;
            99
        });

        assert_eq!(v1, 42);
        assert_eq!(v2, 42);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn get_or_compute_caches_success() {
        let c = cache(4);
        let v: Result<u32, String> = c.get_or_compute("k", None, || async { Ok(7) }).await;
        assert_eq!(v, Ok(7));

        // Second call is served from the cache — supplier would fail.
        let v: Result<u32, String> = c
            .get_or_compute("k", None, || async { Err("should not run".to_string()) })
            .await;
        assert_eq!(v, Ok(7));
    }

    #[tokio::test]
    async fn get_or_compute_failure_caches_nothing() {
        let c = cache(4);
        let v: Result<u32, String> = c
            .get_or_compute("k", None, || async { Err("upstream down".to_string()) })
            .await;
        assert!(v.is_err());
        assert!(c.is_empty());
    }

    #[test]
    fn registry_snapshots_named_caches() {
        let registry = CacheRegistry::new();
        let scenarios = Arc::new(cache(4));
        let profiles = Arc::new(cache(8));

        registry.register("scenarios", scenarios.clone());
        registry.register("profiles", profiles);

        scenarios.insert("oslo", 1);
        scenarios.get("oslo");

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].name, "profiles");
        assert_eq!(snapshot[1].name, "scenarios");
        assert_eq!(snapshot[1].stats.hits, 1);
    }
}
