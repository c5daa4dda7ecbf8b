//! # Bounded, thread-safe TTL cache
//!
//! [`TtlCache`] is a fixed-capacity key/value store where every entry carries
//! its own expiry instant. Expired entries are treated as absent and evicted
//! on access; when the map is full, `set` evicts the least-recently-used live
//! entry to make room. All operations hold a single mutex over the whole map
//! (no per-key locking): a hosting server may call the cached position
//! provider concurrently from multiple request-handling threads.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
    last_used: u64,
}

struct CacheInner<K, V> {
    map: HashMap<K, CacheEntry<V>>,
    // monotonically increasing recency stamp
    tick: u64,
}

pub struct TtlCache<K, V> {
    inner: Mutex<CacheInner<K, V>>,
    maxsize: usize,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache holding at most `maxsize` entries (minimum 1).
    pub fn new(maxsize: usize) -> Self {
        TtlCache {
            inner: Mutex::new(CacheInner {
                map: HashMap::new(),
                tick: 0,
            }),
            maxsize: maxsize.max(1),
        }
    }

    /// Look up a key, evicting it if its TTL has elapsed.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        let expired = inner.map.get(key).map(|entry| now >= entry.expires_at);
        match expired {
            None => None,
            Some(true) => {
                inner.map.remove(key);
                None
            }
            Some(false) => {
                let tick = inner.tick;
                inner.tick += 1;
                let entry = inner.map.get_mut(key)?;
                entry.last_used = tick;
                Some(entry.value.clone())
            }
        }
    }

    /// Insert a value with the given TTL, evicting the least-recently-used
    /// live entry if the cache is at capacity.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        inner.map.retain(|_, entry| now < entry.expires_at);

        if inner.map.len() >= self.maxsize && !inner.map.contains_key(&key) {
            if let Some(oldest) = inner
                .map
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(k, _)| k.clone())
            {
                inner.map.remove(&oldest);
            }
        }

        let tick = inner.tick;
        inner.tick += 1;
        inner.map.insert(
            key,
            CacheEntry {
                value,
                expires_at: now + ttl,
                last_used: tick,
            },
        );
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.map.clear();
    }

    /// Number of stored entries, expired ones included until next access.
    pub fn len(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod cache_test {
    use super::*;

    #[test]
    fn test_set_get_round_trip() {
        let cache: TtlCache<&str, u32> = TtlCache::new(4);
        cache.set("a", 1, Duration::from_secs(60));
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"b"), None);
    }

    #[test]
    fn test_expired_entry_is_absent() {
        let cache: TtlCache<&str, u32> = TtlCache::new(4);
        cache.set("a", 1, Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get(&"a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_full_cache_evicts_least_recently_used() {
        let cache: TtlCache<&str, u32> = TtlCache::new(2);
        cache.set("a", 1, Duration::from_secs(60));
        cache.set("b", 2, Duration::from_secs(60));

        // touch "a" so "b" becomes the eviction candidate
        assert_eq!(cache.get(&"a"), Some(1));
        cache.set("c", 3, Duration::from_secs(60));

        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.get(&"c"), Some(3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache: TtlCache<&str, u32> = TtlCache::new(2);
        cache.set("a", 1, Duration::from_secs(60));
        cache.set("b", 2, Duration::from_secs(60));
        cache.set("a", 10, Duration::from_secs(60));

        assert_eq!(cache.get(&"a"), Some(10));
        assert_eq!(cache.get(&"b"), Some(2));
    }

    #[test]
    fn test_clear() {
        let cache: TtlCache<&str, u32> = TtlCache::new(4);
        cache.set("a", 1, Duration::from_secs(60));
        cache.clear();
        assert_eq!(cache.get(&"a"), None);
        assert!(cache.is_empty());
    }
}
