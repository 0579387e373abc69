use std::sync::atomic::{AtomicU64, Ordering};

use crate::task::TaskId;

/// Hands out task identifiers `1, 2, 3, ...` to any number of concurrent
/// callers. Every call observes a distinct value, one greater than the value
/// handed out before it.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: AtomicU64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next identifier.
    ///
    /// The read-increment-write happens as a single atomic operation, so no
    /// two callers can ever be handed the same id.
    pub fn next(&self) -> TaskId {
        self.last.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Last identifier handed out, `0` if none yet.
    pub fn last(&self) -> TaskId {
        self.last.load(Ordering::Acquire)
    }
}
