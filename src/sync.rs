//! Minimal non-blocking synchronization primitives.

use std::sync::atomic::{AtomicBool, Ordering};

/// A one-bit try-lock.
///
/// Acquisition never waits: a failed [`try_lock`](AtomicFlag::try_lock)
/// means the protected work is already in progress and the caller should
/// skip it. The returned guard releases the flag on drop, including on
/// panic unwind.
#[derive(Debug, Default)]
pub struct AtomicFlag {
    locked: AtomicBool,
}

impl AtomicFlag {
    pub const fn new() -> Self {
        AtomicFlag {
            locked: AtomicBool::new(false),
        }
    }

    /// Attempt to claim the flag. Returns `None` if it is already held.
    pub fn try_lock(&self) -> Option<FlagGuard<'_>> {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| FlagGuard { flag: self })
    }

    /// Whether the flag is currently held. Advisory only; the answer can be
    /// stale by the time the caller acts on it.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }
}

/// Holds the flag until dropped.
#[derive(Debug)]
pub struct FlagGuard<'a> {
    flag: &'a AtomicFlag,
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.flag.locked.store(false, Ordering::Release);
    }
}
