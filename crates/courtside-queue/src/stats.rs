//! Atomic queue statistics for lock-free usage tracking.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of queue activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Payloads accepted by `enqueue`.
    pub enqueued: u64,
    /// Payloads handed out by `try_dequeue` / `dequeue`.
    pub dequeued: u64,
    /// Full scans that found only empty slots.
    pub empty_scans: u64,
    /// Enqueues refused because the capacity was exhausted.
    pub rejected: u64,
}

impl QueueStats {
    /// Payloads accepted but not yet handed out.
    #[must_use]
    pub fn in_flight(&self) -> u64 {
        self.enqueued.saturating_sub(self.dequeued)
    }
}

/// Atomic queue counters, updated without locks.
pub struct AtomicQueueStats {
    enqueued: AtomicU64,
    dequeued: AtomicU64,
    empty_scans: AtomicU64,
    rejected: AtomicU64,
}

impl AtomicQueueStats {
    /// Create new zeroed stats.
    pub fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            dequeued: AtomicU64::new(0),
            empty_scans: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Take a snapshot of current stats.
    pub fn snapshot(&self) -> QueueStats {
        QueueStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dequeued: self.dequeued.load(Ordering::Relaxed),
            empty_scans: self.empty_scans.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }

    /// Increment the enqueue counter.
    pub fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the dequeue counter.
    pub fn record_dequeued(&self) {
        self.dequeued.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the empty-scan counter.
    pub fn record_empty_scan(&self) {
        self.empty_scans.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the rejection counter.
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for AtomicQueueStats {
    fn default() -> Self {
        Self::new()
    }
}
