//! Shared change counter for the document tree.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A counter shared between a document and every section and setting
/// attached to it.
///
/// Children hold a clone of the document's tracker instead of a back
/// reference to the parent, so mutation anywhere in the tree bumps the same
/// counter without creating an ownership cycle. Detached nodes carry their
/// own private counter, which is simply discarded when they are attached.
#[derive(Debug, Clone, Default)]
pub(crate) struct ChangeTracker(Arc<AtomicU64>);

impl ChangeTracker {
    /// Record one mutation.
    pub(crate) fn bump(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of mutations recorded since creation or the last reset.
    pub(crate) fn count(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    /// Atomically read and zero the counter, returning the old count.
    pub(crate) fn reset(&self) -> u64 {
        self.0.swap(0, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_and_count() {
        let tracker = ChangeTracker::default();
        assert_eq!(tracker.count(), 0);

        tracker.bump();
        tracker.bump();
        assert_eq!(tracker.count(), 2);
    }

    #[test]
    fn test_reset_returns_old_count() {
        let tracker = ChangeTracker::default();
        tracker.bump();
        tracker.bump();
        tracker.bump();

        assert_eq!(tracker.reset(), 3);
        assert_eq!(tracker.count(), 0);
    }

    #[test]
    fn test_clones_share_the_counter() {
        let tracker = ChangeTracker::default();
        let child = tracker.clone();

        child.bump();
        assert_eq!(tracker.count(), 1);
    }
}
