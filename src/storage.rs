//! Internal storage implementation for the cache.
//!
//! An `IndexMap` behind a read-write lock. Index order doubles as eviction
//! order: a prune pass sorts the map by the configured strategy and removes
//! from the front. Lock poisoning is treated as a miss or a no-op, never a
//! panic.

use indexmap::IndexMap;
use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use crate::config::{CacheConfig, EvictStrategy, StoreStrategy};
use crate::entry::Entry;
use crate::stats::CacheStats;
use crate::sync::AtomicFlag;

/// Thread-safe store shared by all `Cache` handles.
#[derive(Debug)]
pub(crate) struct Store<K, V> {
    entries: RwLock<IndexMap<K, Entry<V>>>,

    config: CacheConfig,

    stats: Arc<CacheStats>,

    /// Single-flight marker for prune passes.
    prune_flag: AtomicFlag,

    /// Once set, inserts and prunes become no-ops.
    closed: AtomicBool,
}

impl<K: Hash + Eq, V> Store<K, V> {
    pub fn new(config: CacheConfig) -> Self {
        Store {
            entries: RwLock::new(IndexMap::new()),
            config,
            stats: Arc::new(CacheStats::new()),
            prune_flag: AtomicFlag::new(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn stats(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }

    /// Look up a value, refreshing its access time and desirability.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let mut entries = match self.write_lock() {
            Some(e) => e,
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        match entries.get_mut(key) {
            Some(entry) => {
                entry.touch();
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Store a value according to the configured store strategy.
    ///
    /// Returns `false` when the strategy keeps the existing value (or the
    /// cache is closed); the caller's value is dropped in that case.
    pub fn insert(&self, key: K, value: V) -> bool
    where
        V: PartialEq,
    {
        if self.is_closed() {
            return false;
        }
        let mut entries = match self.write_lock() {
            Some(e) => e,
            None => return false,
        };

        let stored = match entries.get_mut(&key) {
            None => {
                entries.insert(key, Entry::new(value));
                self.stats.record_insert();
                true
            }
            Some(existing) => match self.config.store_strategy() {
                StoreStrategy::Fail => false,
                StoreStrategy::ReplaceAlways => {
                    *existing = Entry::new(value);
                    self.stats.record_insert();
                    true
                }
                StoreStrategy::ReplaceNoMatch => {
                    if existing.value != value {
                        *existing = Entry::new(value);
                        self.stats.record_insert();
                    }
                    true
                }
            },
        };

        self.stats.set_size(entries.len() as u64);
        stored
    }

    /// Remove a key, returning its value if it was present.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut entries = self.write_lock()?;
        let removed = entries.shift_remove(key);
        if removed.is_some() {
            self.stats.record_drop();
        }
        self.stats.set_size(entries.len() as u64);
        removed.map(|entry| entry.value)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read_lock().map_or(false, |e| e.contains_key(key))
    }

    pub fn len(&self) -> usize {
        self.read_lock().map_or(0, |e| e.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Some(mut entries) = self.write_lock() {
            entries.clear();
            self.stats.set_size(0);
        }
    }

    /// Stop the cache: inserts and prunes become no-ops and any background
    /// prune thread exits at its next wakeup. Safe to call with a prune in
    /// flight.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Run one prune pass.
    ///
    /// Returns `false` without touching the store when the cache is closed
    /// or another prune is already in flight. A pass first evicts by the
    /// configured strategy until the size is within capacity, then sweeps
    /// entries idle longer than the strategy's threshold, and never drops
    /// the size below the retention floor.
    pub fn prune(&self) -> bool {
        if self.is_closed() {
            return false;
        }
        let _guard = match self.prune_flag.try_lock() {
            Some(guard) => guard,
            None => return false,
        };
        let mut entries = match self.write_lock() {
            Some(e) => e,
            None => return false,
        };

        let retention = self.config.retention();
        if entries.len() <= retention {
            self.stats.record_prune();
            return true;
        }
        // usage-ranked eviction has nothing to do while within capacity;
        // age does not degrade a LeastUsed ranking
        if entries.len() <= self.config.capacity()
            && self.config.evict_strategy() == EvictStrategy::LeastUsed
        {
            self.stats.record_prune();
            return true;
        }

        match self.config.evict_strategy() {
            EvictStrategy::LeastRecent => entries.sort_by(|_, a, _, b| {
                a.last_access
                    .cmp(&b.last_access)
                    .then(a.desirability.cmp(&b.desirability))
            }),
            EvictStrategy::LeastUsed => entries.sort_by(|_, a, _, b| {
                a.desirability
                    .cmp(&b.desirability)
                    .then(a.last_access.cmp(&b.last_access))
            }),
        }

        let mut evicted: u64 = 0;
        while entries.len() > self.config.capacity() && entries.len() > retention {
            entries.shift_remove_index(0);
            evicted += 1;
        }

        let now = Instant::now();
        let threshold = self.config.idle_threshold();
        while entries.len() > retention {
            let expired = entries
                .get_index(0)
                .map_or(false, |(_, entry)| entry.idle(now) > threshold);
            if !expired {
                break;
            }
            entries.shift_remove_index(0);
            evicted += 1;
        }

        for _ in 0..evicted {
            self.stats.record_eviction();
        }
        self.stats.set_size(entries.len() as u64);
        self.stats.record_prune();
        tracing::debug!(evicted, remaining = entries.len(), "prune pass complete");
        true
    }

    /// Age an entry for idle-sweep tests.
    #[cfg(test)]
    pub fn backdate<Q>(&self, key: &Q, by: std::time::Duration)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(mut entries) = self.write_lock() {
            if let Some(entry) = entries.get_mut(key) {
                entry.backdate(by);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn prune_flag(&self) -> &AtomicFlag {
        &self.prune_flag
    }

    fn read_lock(&self) -> Option<RwLockReadGuard<'_, IndexMap<K, Entry<V>>>> {
        self.entries.read().ok()
    }

    fn write_lock(&self) -> Option<RwLockWriteGuard<'_, IndexMap<K, Entry<V>>>> {
        self.entries.write().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn store_with(config: CacheConfig) -> Store<String, String> {
        Store::new(config)
    }

    fn fill(store: &Store<String, String>, count: usize) {
        for i in 0..count {
            store.insert(format!("key{i}"), format!("value{i}"));
        }
    }

    #[test]
    fn test_basic_insert_get() {
        let store = store_with(CacheConfig::new());
        assert!(store.insert("a".to_string(), "1".to_string()));
        assert_eq!(store.get("a"), Some("1".to_string()));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_store_strategy_fail() {
        let store = store_with(CacheConfig::new().with_store_strategy(StoreStrategy::Fail));
        assert!(store.insert("a".to_string(), "1".to_string()));
        assert!(!store.insert("a".to_string(), "2".to_string()));
        assert_eq!(store.get("a"), Some("1".to_string()));
    }

    #[test]
    fn test_store_strategy_replace_always() {
        let store =
            store_with(CacheConfig::new().with_store_strategy(StoreStrategy::ReplaceAlways));
        store.insert("a".to_string(), "1".to_string());
        assert!(store.insert("a".to_string(), "2".to_string()));
        assert_eq!(store.get("a"), Some("2".to_string()));
    }

    #[test]
    fn test_store_strategy_replace_no_match_keeps_equal_entry() {
        let store = store_with(CacheConfig::new());
        store.insert("a".to_string(), "1".to_string());
        let _ = store.get("a"); // desirability 2

        // equal value: entry kept, bookkeeping intact
        assert!(store.insert("a".to_string(), "1".to_string()));
        // differing value: replaced, bookkeeping reset
        assert!(store.insert("a".to_string(), "2".to_string()));
        assert_eq!(store.get("a"), Some("2".to_string()));
    }

    #[test]
    fn test_remove_and_contains() {
        let store = store_with(CacheConfig::new());
        store.insert("a".to_string(), "1".to_string());
        assert!(store.contains("a"));

        assert_eq!(store.remove("a"), Some("1".to_string()));
        assert!(!store.contains("a"));
        assert_eq!(store.remove("a"), None);
    }

    #[test]
    fn test_clear() {
        let store = store_with(CacheConfig::new());
        fill(&store, 5);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.stats().size(), 0);
    }

    #[test]
    fn test_prune_respects_capacity() {
        let store = store_with(CacheConfig::new().with_capacity(3).with_retention(0));
        fill(&store, 6);

        assert!(store.prune());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_prune_least_recent_keeps_touched_entries() {
        let store = store_with(CacheConfig::new().with_capacity(2).with_retention(0));
        fill(&store, 3);
        // refresh key0 and key2 so key1 is the stalest
        std::thread::sleep(Duration::from_millis(5));
        let _ = store.get("key0");
        let _ = store.get("key2");

        assert!(store.prune());
        assert_eq!(store.len(), 2);
        assert!(!store.contains("key1"));
        assert!(store.contains("key0"));
        assert!(store.contains("key2"));
    }

    #[test]
    fn test_prune_least_used_evicts_coldest() {
        let config = CacheConfig::new()
            .with_capacity(2)
            .with_retention(0)
            .with_evict_strategy(EvictStrategy::LeastUsed);
        let store = store_with(config);
        fill(&store, 3);
        let _ = store.get("key0");
        let _ = store.get("key0");
        let _ = store.get("key2");

        assert!(store.prune());
        assert!(!store.contains("key1"));
        assert!(store.contains("key0"));
        assert!(store.contains("key2"));
    }

    #[test]
    fn test_prune_never_goes_below_retention() {
        let store = store_with(CacheConfig::new().with_capacity(2).with_retention(4));
        fill(&store, 6);

        assert!(store.prune());
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_prune_below_retention_is_noop() {
        let store = store_with(CacheConfig::new().with_capacity(100).with_retention(10));
        fill(&store, 5);

        assert!(store.prune());
        assert_eq!(store.len(), 5);
        assert_eq!(store.stats().evictions(), 0);
    }

    #[test]
    fn test_prune_least_used_within_capacity_is_noop() {
        let config = CacheConfig::new()
            .with_capacity(100)
            .with_retention(0)
            .with_evict_strategy(EvictStrategy::LeastUsed)
            .with_min_idle(Duration::from_secs(0));
        let store = store_with(config);
        fill(&store, 20);
        store.backdate("key0", Duration::from_secs(3600));

        assert!(store.prune());
        assert_eq!(store.len(), 20);
    }

    #[test]
    fn test_prune_sweeps_idle_entries() {
        let config = CacheConfig::new()
            .with_capacity(100)
            .with_retention(0)
            .with_max_idle(Duration::from_secs(60));
        let store = store_with(config);
        fill(&store, 4);
        store.backdate("key0", Duration::from_secs(3600));
        store.backdate("key1", Duration::from_secs(3600));

        assert!(store.prune());
        assert_eq!(store.len(), 2);
        assert!(!store.contains("key0"));
        assert!(!store.contains("key1"));
        assert_eq!(store.stats().evictions(), 2);
    }

    #[test]
    fn test_prune_is_single_flight() {
        let store = store_with(CacheConfig::new());
        fill(&store, 5);

        let guard = store.prune_flag().try_lock().unwrap();
        assert!(!store.prune());
        drop(guard);
        assert!(store.prune());
    }

    #[test]
    fn test_closed_store_rejects_work() {
        let store = store_with(CacheConfig::new());
        fill(&store, 2);
        store.close();

        assert!(!store.insert("new".to_string(), "v".to_string()));
        assert!(!store.prune());
        // reads still work after close
        assert_eq!(store.get("key0"), Some("value0".to_string()));
    }

    #[test]
    fn test_stats_tracking() {
        let store = store_with(CacheConfig::new());
        store.insert("a".to_string(), "1".to_string());
        let _ = store.get("a");
        let _ = store.get("missing");
        store.remove("a");

        let stats = store.stats();
        assert_eq!(stats.hits(), 1);
        assert_eq!(stats.misses(), 1);
        assert_eq!(stats.inserts(), 1);
        assert_eq!(stats.drops(), 1);
        assert_eq!(stats.size(), 0);
    }
}
