//! Statistics for cache operations.
//!
//! All counters are atomic and diagnostic only: they are never consulted by
//! storage or eviction decisions, so recording them stays off the hot path's
//! locking.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters shared by all handles to one cache.
///
/// Use `Cache::stats()` for a plain-value snapshot.
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Lookups that found a live entry.
    hits: AtomicU64,

    /// Lookups that found nothing.
    misses: AtomicU64,

    /// Entries removed by a prune pass (capacity or age).
    evictions: AtomicU64,

    /// Successful insert operations.
    inserts: AtomicU64,

    /// Explicit removals.
    drops: AtomicU64,

    /// Completed prune passes.
    prunes: AtomicU64,

    /// Current number of entries.
    size: AtomicU64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_drop(&self) {
        self.drops.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prune(&self) {
        self.prunes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_size(&self, size: u64) {
        self.size.store(size, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    pub fn inserts(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }

    pub fn drops(&self) -> u64 {
        self.drops.load(Ordering::Relaxed)
    }

    pub fn prunes(&self) -> u64 {
        self.prunes.load(Ordering::Relaxed)
    }

    pub fn size(&self) -> u64 {
        self.size.load(Ordering::Relaxed)
    }

    /// Hit rate as a percentage, 0.0 when nothing has been looked up.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }

    /// A plain-value copy of the counters, safe to log or compare.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits(),
            misses: self.misses(),
            evictions: self.evictions(),
            inserts: self.inserts(),
            drops: self.drops(),
            prunes: self.prunes(),
            size: self.size(),
            hit_rate: self.hit_rate(),
        }
    }
}

/// A point-in-time snapshot of [`CacheStats`].
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub inserts: u64,
    pub drops: u64,
    pub prunes: u64,
    pub size: u64,
    pub hit_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_stats() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits(), 0);
        assert_eq!(stats.misses(), 0);
        assert_eq!(stats.size(), 0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_record_operations() {
        let stats = CacheStats::new();

        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        stats.record_insert();
        stats.record_eviction();

        assert_eq!(stats.hits(), 2);
        assert_eq!(stats.misses(), 1);
        assert_eq!(stats.inserts(), 1);
        assert_eq!(stats.evictions(), 1);
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();

        assert!((stats.hit_rate() - 75.0).abs() < 0.01);
    }

    #[test]
    fn test_snapshot() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_insert();
        stats.set_size(1);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.hits, 1);
        assert_eq!(snapshot.inserts, 1);
        assert_eq!(snapshot.size, 1);
    }
}
