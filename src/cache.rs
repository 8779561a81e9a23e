//! Public cache API.
//!
//! [`Cache`] is a cheap-to-clone handle over shared storage; every clone
//! sees the same entries, configuration, and statistics. The storage logic
//! itself lives in [`crate::storage`].

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

use crate::config::CacheConfig;
use crate::stats::StatsSnapshot;
use crate::storage::Store;

/// A bounded in-memory cache with strategy-driven eviction.
///
/// Size limits are enforced by explicit or periodic [`prune`](Cache::prune)
/// passes, not on insert; between passes the cache may exceed its capacity.
///
/// # Example
/// ```
/// use inikit::{Cache, CacheConfig};
///
/// let cache: Cache<String, String> = Cache::new(CacheConfig::new().with_capacity(2).with_retention(0));
/// cache.insert("a".to_string(), "1".to_string());
/// assert_eq!(cache.get("a"), Some("1".to_string()));
/// ```
#[derive(Debug)]
pub struct Cache<K, V> {
    store: Arc<Store<K, V>>,
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Cache {
            store: Arc::clone(&self.store),
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Create a cache with the given configuration.
    ///
    /// When the configuration carries a prune interval, a background thread
    /// is started that prunes periodically. The thread holds only a weak
    /// reference and exits once every handle is dropped or the cache is
    /// closed.
    pub fn new(config: CacheConfig) -> Self {
        let store = Arc::new(Store::new(config));
        if let Some(interval) = store.config().prune_interval() {
            spawn_pruner(Arc::downgrade(&store), interval);
        }
        Cache { store }
    }

    /// Create a cache with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<K: Hash + Eq, V> Cache<K, V> {
    /// Look up a value. A hit refreshes the entry's access time and
    /// desirability.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.store.get(key)
    }

    /// Store a value. Returns `false` when the configured store strategy
    /// keeps the existing entry instead.
    pub fn insert(&self, key: K, value: V) -> bool
    where
        V: PartialEq,
    {
        self.store.insert(key, value)
    }

    /// Remove a key, returning its value if it was present.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.remove(key)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.contains(key)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn clear(&self) {
        self.store.clear()
    }

    /// Run one prune pass now. Returns `false` when skipped because another
    /// pass is in flight or the cache is closed.
    pub fn prune(&self) -> bool {
        self.store.prune()
    }

    /// Permanently stop the cache: further inserts and prunes are no-ops
    /// and the background pruner, if any, exits. Reads keep working.
    pub fn close(&self) {
        self.store.close()
    }

    pub fn is_closed(&self) -> bool {
        self.store.is_closed()
    }

    pub fn config(&self) -> &CacheConfig {
        self.store.config()
    }

    /// A point-in-time copy of the diagnostic counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.store.stats().snapshot()
    }

    #[cfg(test)]
    pub(crate) fn backdate<Q>(&self, key: &Q, by: Duration)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.backdate(key, by)
    }
}

fn spawn_pruner<K, V>(store: Weak<Store<K, V>>, interval: Duration)
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    let result = thread::Builder::new()
        .name("inikit-cache-prune".to_string())
        .spawn(move || loop {
            thread::sleep(interval);
            let store = match store.upgrade() {
                Some(store) => store,
                None => break,
            };
            if store.is_closed() {
                break;
            }
            store.prune();
        });

    if let Err(err) = result {
        tracing::warn!(error = %err, "failed to start cache prune thread");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvictStrategy;

    #[test]
    fn test_handles_share_storage() {
        let cache: Cache<String, i32> = Cache::with_defaults();
        let other = cache.clone();

        cache.insert("a".to_string(), 1);
        assert_eq!(other.get("a"), Some(1));

        other.remove("a");
        assert!(!cache.contains("a"));
    }

    #[test]
    fn test_least_recent_eviction_through_handle() {
        let cache: Cache<String, i32> = Cache::new(
            CacheConfig::new()
                .with_capacity(2)
                .with_retention(0)
                .with_evict_strategy(EvictStrategy::LeastRecent),
        );
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.insert("c".to_string(), 3);
        cache.backdate("b", Duration::from_secs(10));

        assert!(cache.prune());
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("b"));
    }

    #[test]
    fn test_close_stops_inserts() {
        let cache: Cache<String, i32> = Cache::with_defaults();
        cache.insert("a".to_string(), 1);
        cache.close();

        assert!(!cache.insert("b".to_string(), 2));
        assert!(!cache.prune());
        assert!(cache.is_closed());
        assert_eq!(cache.get("a"), Some(1));
    }

    #[test]
    fn test_stats_through_handle() {
        let cache: Cache<String, i32> = Cache::with_defaults();
        cache.insert("a".to_string(), 1);
        let _ = cache.get("a");
        let _ = cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_background_pruner_enforces_capacity() {
        let cache: Cache<String, i32> = Cache::new(
            CacheConfig::new()
                .with_capacity(2)
                .with_retention(0)
                .with_prune_interval(Some(Duration::from_millis(1))),
        );
        for i in 0..6 {
            cache.insert(format!("key{i}"), i);
        }

        // interval is clamped to one second; wait out one tick
        thread::sleep(Duration::from_millis(1300));
        assert!(cache.len() <= 2);
        cache.close();
    }
}
