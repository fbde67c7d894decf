//! Ticket-based bounded MPMC queue.
//!
//! Producers claim a ticket with an atomic fetch-and-increment that refuses to
//! pass the capacity, then publish their payload into the slot with that
//! index. Consumers scan `0..tickets_issued()` and swap each slot with `None`;
//! the swap is the only read of a payload, so at most one consumer can ever
//! see it. Slots are never reused: the capacity bounds the total number of
//! enqueues over the queue's lifetime, not the number of payloads in flight.
//!
//! The queue does not know when producers are finished. `dequeue` spins until
//! a payload shows up, so callers must account for the final ticket count
//! themselves before calling it.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::atomic::AtomicCell;
use crossbeam::utils::Backoff;
use tracing::trace;

use crate::stats::{AtomicQueueStats, QueueStats};

/// Returned by [`TicketQueue::enqueue`] once every slot has been claimed.
///
/// The rejected payload is handed back in `value`.
#[derive(Debug, thiserror::Error)]
#[error("queue full: all {capacity} slots have been claimed")]
pub struct QueueFullError<T> {
    /// Fixed slot count of the queue.
    pub capacity: usize,
    /// The payload that could not be enqueued.
    pub value: T,
}

impl<T> QueueFullError<T> {
    /// Recover the rejected payload.
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Lock-free bounded queue with monotonically assigned slot tickets.
pub struct TicketQueue<T> {
    slots: Box<[AtomicCell<Option<Box<T>>>]>,
    tail: AtomicUsize,
    stats: AtomicQueueStats,
}

impl<T> TicketQueue<T> {
    /// Create a queue with `capacity` slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let slots = (0..capacity).map(|_| AtomicCell::new(None)).collect();
        Self {
            slots,
            tail: AtomicUsize::new(0),
            stats: AtomicQueueStats::new(),
        }
    }

    /// Total number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of tickets handed out so far.
    #[must_use]
    pub fn tickets_issued(&self) -> usize {
        self.tail.load(Ordering::Acquire)
    }

    /// Whether every slot has been claimed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.tickets_issued() >= self.capacity()
    }

    /// Snapshot of the queue counters.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        self.stats.snapshot()
    }

    /// Claim the next ticket and store `value` in its slot.
    ///
    /// Never blocks. Returns the ticket on success.
    pub fn enqueue(&self, value: T) -> Result<usize, QueueFullError<T>> {
        let capacity = self.capacity();
        let claimed = self
            .tail
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |tail| {
                (tail < capacity).then_some(tail + 1)
            });

        match claimed {
            Ok(ticket) => {
                self.slots[ticket].store(Some(Box::new(value)));
                self.stats.record_enqueued();
                trace!(ticket, "payload enqueued");
                Ok(ticket)
            }
            Err(_) => {
                self.stats.record_rejected();
                Err(QueueFullError { capacity, value })
            }
        }
    }

    /// Scan the issued slots once and take the first live payload.
    ///
    /// Returns `None` when the scan only met empty slots. A ticket whose
    /// producer has not published yet reads as empty.
    pub fn try_dequeue(&self) -> Option<T> {
        let end = self.tickets_issued().min(self.capacity());
        for (index, slot) in self.slots[..end].iter().enumerate() {
            if let Some(value) = slot.swap(None) {
                self.stats.record_dequeued();
                trace!(ticket = index, "payload dequeued");
                return Some(*value);
            }
        }
        self.stats.record_empty_scan();
        None
    }

    /// Spin until a payload can be taken.
    ///
    /// This never returns on a queue that stays empty.
    pub fn dequeue(&self) -> T {
        let backoff = Backoff::new();
        loop {
            if let Some(value) = self.try_dequeue() {
                return value;
            }
            backoff.snooze();
        }
    }
}

impl<T> fmt::Debug for TicketQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketQueue")
            .field("capacity", &self.capacity())
            .field("tickets_issued", &self.tickets_issued())
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    use parking_lot::Mutex;

    #[test]
    fn slots_are_lock_free() {
        assert!(AtomicCell::<Option<Box<String>>>::is_lock_free());
    }

    #[test]
    fn fifo_without_contention() {
        let queue = TicketQueue::with_capacity(8);
        for word in ["a", "b", "c", "d"] {
            queue.enqueue(word.to_string()).unwrap();
        }
        let drained: Vec<String> = (0..4).map(|_| queue.dequeue()).collect();
        assert_eq!(drained, ["a", "b", "c", "d"]);
        assert_eq!(queue.try_dequeue(), None);
    }

    #[test]
    fn tickets_are_sequential() {
        let queue = TicketQueue::with_capacity(3);
        assert_eq!(queue.enqueue(10).unwrap(), 0);
        assert_eq!(queue.enqueue(11).unwrap(), 1);
        assert_eq!(queue.enqueue(12).unwrap(), 2);
        assert_eq!(queue.tickets_issued(), 3);
        assert!(queue.is_exhausted());
    }

    #[test]
    fn tickets_are_not_reused_after_dequeue() {
        let queue = TicketQueue::with_capacity(2);
        queue.enqueue(1).unwrap();
        assert_eq!(queue.dequeue(), 1);
        assert_eq!(queue.enqueue(2).unwrap(), 1);
        let err = queue.enqueue(3).unwrap_err();
        assert_eq!(err.capacity, 2);
        assert_eq!(err.into_inner(), 3);
    }

    #[test]
    fn overflow_is_reported_and_counted() {
        let queue = TicketQueue::with_capacity(1);
        queue.enqueue("first").unwrap();
        let err = queue.enqueue("second").unwrap_err();
        assert_eq!(err.to_string(), "queue full: all 1 slots have been claimed");
        assert_eq!(queue.tickets_issued(), 1);
        assert_eq!(queue.stats().rejected, 1);
    }

    #[test]
    fn zero_capacity_rejects_everything() {
        let queue = TicketQueue::with_capacity(0);
        assert!(queue.enqueue(()).is_err());
        assert_eq!(queue.try_dequeue(), None);
    }

    #[test]
    fn empty_scan_returns_none() {
        let queue: TicketQueue<u32> = TicketQueue::with_capacity(4);
        assert_eq!(queue.try_dequeue(), None);
        assert_eq!(queue.stats().empty_scans, 1);
    }

    #[test]
    fn lower_tickets_come_first_after_interleaving() {
        let queue = TicketQueue::with_capacity(8);
        queue.enqueue(0).unwrap();
        queue.enqueue(1).unwrap();
        assert_eq!(queue.dequeue(), 0);
        queue.enqueue(2).unwrap();
        queue.enqueue(3).unwrap();
        assert_eq!(queue.dequeue(), 1);
        assert_eq!(queue.dequeue(), 2);
        assert_eq!(queue.dequeue(), 3);
    }

    #[test]
    fn concurrent_consumers_see_each_payload_once() {
        const ITEMS: usize = 2_000;
        const CONSUMERS: usize = 4;

        let queue = TicketQueue::with_capacity(ITEMS);
        for i in 0..ITEMS {
            queue.enqueue(i).unwrap();
        }

        let seen = Mutex::new(Vec::with_capacity(ITEMS));
        std::thread::scope(|s| {
            for _ in 0..CONSUMERS {
                s.spawn(|| {
                    let mut local = Vec::new();
                    while let Some(v) = queue.try_dequeue() {
                        local.push(v);
                    }
                    seen.lock().extend(local);
                });
            }
        });

        let seen = seen.into_inner();
        assert_eq!(seen.len(), ITEMS);
        let unique: HashSet<usize> = seen.into_iter().collect();
        assert_eq!(unique.len(), ITEMS);
        assert_eq!(queue.stats().in_flight(), 0);
    }

    #[test]
    fn concurrent_producers_and_consumers() {
        const PER_PRODUCER: usize = 500;
        const PRODUCERS: usize = 3;
        const TOTAL: usize = PER_PRODUCER * PRODUCERS;

        let queue = TicketQueue::with_capacity(TOTAL);
        let taken = AtomicUsize::new(0);
        let seen = Mutex::new(HashSet::new());

        std::thread::scope(|s| {
            for p in 0..PRODUCERS {
                let queue = &queue;
                s.spawn(move || {
                    for i in 0..PER_PRODUCER {
                        queue.enqueue(p * PER_PRODUCER + i).unwrap();
                    }
                });
            }
            for _ in 0..2 {
                s.spawn(|| loop {
                    // Claim before dequeue so no consumer spins on a drained queue.
                    let claim = taken.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                        (n < TOTAL).then_some(n + 1)
                    });
                    if claim.is_err() {
                        break;
                    }
                    let value = queue.dequeue();
                    assert!(seen.lock().insert(value), "duplicate {value}");
                });
            }
        });

        assert_eq!(seen.into_inner().len(), TOTAL);
        let stats = queue.stats();
        assert_eq!(stats.enqueued, TOTAL as u64);
        assert_eq!(stats.dequeued, TOTAL as u64);
    }

    #[test]
    fn debug_output_mentions_capacity() {
        let queue: TicketQueue<u8> = TicketQueue::with_capacity(5);
        let text = format!("{queue:?}");
        assert!(text.contains("capacity: 5"));
    }
}
