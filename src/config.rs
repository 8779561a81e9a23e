//! Cache tuning knobs.

use std::time::Duration;

/// How an insert behaves when the key is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreStrategy {
    /// Keep the existing value; the insert reports failure.
    Fail,
    /// Replace only when the new value differs from the stored one.
    #[default]
    ReplaceNoMatch,
    /// Replace unconditionally.
    ReplaceAlways,
}

/// Which entries a prune pass sacrifices first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictStrategy {
    /// Oldest access time goes first; desirability breaks ties.
    #[default]
    LeastRecent,
    /// Lowest desirability goes first; access time breaks ties.
    LeastUsed,
}

/// Shortest allowed automatic prune interval. Requests below this are
/// clamped rather than rejected.
pub const MIN_PRUNE_INTERVAL: Duration = Duration::from_secs(1);

const DEFAULT_CAPACITY: usize = 100;
const DEFAULT_RETENTION: usize = 10;
const DEFAULT_MAX_IDLE: Duration = Duration::from_secs(60 * 60);
const DEFAULT_MIN_IDLE: Duration = Duration::from_secs(5 * 60);

/// Configuration for a [`Cache`](crate::Cache), built fluently:
///
/// ```
/// use std::time::Duration;
/// use inikit::{CacheConfig, EvictStrategy};
///
/// let config = CacheConfig::new()
///     .with_capacity(500)
///     .with_retention(50)
///     .with_evict_strategy(EvictStrategy::LeastUsed)
///     .with_prune_interval(Some(Duration::from_secs(30)));
/// assert_eq!(config.capacity(), 500);
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    capacity: usize,
    retention: usize,
    prune_interval: Option<Duration>,
    store_strategy: StoreStrategy,
    evict_strategy: EvictStrategy,
    max_idle: Duration,
    min_idle: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            capacity: DEFAULT_CAPACITY,
            retention: DEFAULT_RETENTION,
            prune_interval: None,
            store_strategy: StoreStrategy::default(),
            evict_strategy: EvictStrategy::default(),
            max_idle: DEFAULT_MAX_IDLE,
            min_idle: DEFAULT_MIN_IDLE,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        CacheConfig::default()
    }

    /// Soft size limit; a prune pass evicts down to this.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Floor below which pruning never evicts, even by age.
    pub fn with_retention(mut self, retention: usize) -> Self {
        self.retention = retention;
        self
    }

    /// Enable periodic background pruning. Intervals below
    /// [`MIN_PRUNE_INTERVAL`] are clamped up; `None` disables the timer.
    pub fn with_prune_interval(mut self, interval: Option<Duration>) -> Self {
        self.prune_interval = interval.map(|d| d.max(MIN_PRUNE_INTERVAL));
        self
    }

    pub fn with_store_strategy(mut self, strategy: StoreStrategy) -> Self {
        self.store_strategy = strategy;
        self
    }

    pub fn with_evict_strategy(mut self, strategy: EvictStrategy) -> Self {
        self.evict_strategy = strategy;
        self
    }

    /// Idle age beyond which `LeastRecent` pruning discards entries.
    pub fn with_max_idle(mut self, max_idle: Duration) -> Self {
        self.max_idle = max_idle;
        self
    }

    /// Idle age beyond which `LeastUsed` pruning discards entries.
    pub fn with_min_idle(mut self, min_idle: Duration) -> Self {
        self.min_idle = min_idle;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    pub fn prune_interval(&self) -> Option<Duration> {
        self.prune_interval
    }

    pub fn store_strategy(&self) -> StoreStrategy {
        self.store_strategy
    }

    pub fn evict_strategy(&self) -> EvictStrategy {
        self.evict_strategy
    }

    pub fn max_idle(&self) -> Duration {
        self.max_idle
    }

    pub fn min_idle(&self) -> Duration {
        self.min_idle
    }

    /// The idle threshold the configured eviction strategy sweeps by.
    pub(crate) fn idle_threshold(&self) -> Duration {
        match self.evict_strategy {
            EvictStrategy::LeastRecent => self.max_idle,
            EvictStrategy::LeastUsed => self.min_idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::new();
        assert_eq!(config.capacity(), 100);
        assert_eq!(config.retention(), 10);
        assert_eq!(config.prune_interval(), None);
        assert_eq!(config.store_strategy(), StoreStrategy::ReplaceNoMatch);
        assert_eq!(config.evict_strategy(), EvictStrategy::LeastRecent);
    }

    #[test]
    fn test_builder_chain() {
        let config = CacheConfig::new()
            .with_capacity(5)
            .with_retention(2)
            .with_store_strategy(StoreStrategy::Fail)
            .with_evict_strategy(EvictStrategy::LeastUsed);

        assert_eq!(config.capacity(), 5);
        assert_eq!(config.retention(), 2);
        assert_eq!(config.store_strategy(), StoreStrategy::Fail);
        assert_eq!(config.evict_strategy(), EvictStrategy::LeastUsed);
    }

    #[test]
    fn test_prune_interval_clamped() {
        let config = CacheConfig::new().with_prune_interval(Some(Duration::from_millis(50)));
        assert_eq!(config.prune_interval(), Some(MIN_PRUNE_INTERVAL));

        let config = CacheConfig::new().with_prune_interval(None);
        assert_eq!(config.prune_interval(), None);
    }

    #[test]
    fn test_idle_threshold_follows_strategy() {
        let config = CacheConfig::new();
        assert_eq!(config.idle_threshold(), config.max_idle());

        let config = config.with_evict_strategy(EvictStrategy::LeastUsed);
        assert_eq!(config.idle_threshold(), config.min_idle());
    }
}
