//! Round-robin cursor.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared rotation cursor.
///
/// Every call to [`RoundRobin::next_index`] advances the counter atomically,
/// so concurrent callers never observe the same position without moving it.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next index into a collection of `len` items, or `None` if it is empty.
    pub fn next_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.counter.fetch_add(1, Ordering::Relaxed) % len)
    }
}
