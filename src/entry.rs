//! A single cached record.

use std::time::{Duration, Instant};

/// A stored value with the bookkeeping the eviction strategies sort on.
#[derive(Debug, Clone)]
pub(crate) struct Entry<V> {
    pub value: V,
    /// When the entry was last read or written.
    pub last_access: Instant,
    /// Hit count plus one; higher survives longer under `LeastUsed`.
    pub desirability: u64,
}

impl<V> Entry<V> {
    pub fn new(value: V) -> Self {
        Entry {
            value,
            last_access: Instant::now(),
            desirability: 1,
        }
    }

    /// Refresh on a hit.
    pub fn touch(&mut self) {
        self.last_access = Instant::now();
        self.desirability += 1;
    }

    /// How long since the entry was last touched.
    pub fn idle(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_access)
    }

    /// Push the access time into the past, for age-based tests.
    #[cfg(test)]
    pub fn backdate(&mut self, by: Duration) {
        self.last_access -= by;
    }
}
