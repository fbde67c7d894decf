//! Observer pattern for job lifecycle events.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::events::JobEvent;

/// Observer trait for receiving job events.
pub trait JobObserver: Send + Sync {
    /// Receive one event. Called from reader and worker threads.
    fn on_event(&self, event: &JobEvent);
}

/// Registry of observers that fans each event out to all of them.
pub struct ObserverSet {
    observers: RwLock<Vec<Arc<dyn JobObserver>>>,
}

impl ObserverSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer.
    pub fn register(&self, observer: Arc<dyn JobObserver>) {
        self.observers.write().push(observer);
    }

    /// Unregister all observers.
    pub fn clear(&self) {
        self.observers.write().clear();
    }

    /// Notify every registered observer.
    pub fn notify(&self, event: &JobEvent) {
        let observers = self.observers.read();
        for observer in observers.iter() {
            observer.on_event(event);
        }
    }

    /// Number of registered observers.
    #[must_use]
    pub fn count(&self) -> usize {
        self.observers.read().len()
    }
}

impl Default for ObserverSet {
    fn default() -> Self {
        Self::new()
    }
}

impl JobObserver for ObserverSet {
    fn on_event(&self, event: &JobEvent) {
        self.notify(event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::observers::NoOpObserver;

    struct CountingObserver {
        count: AtomicUsize,
    }

    impl JobObserver for CountingObserver {
        fn on_event(&self, _event: &JobEvent) {
            self.count.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn register_and_clear() {
        let set = ObserverSet::new();
        assert_eq!(set.count(), 0);
        set.register(Arc::new(NoOpObserver));
        set.register(Arc::new(NoOpObserver));
        assert_eq!(set.count(), 2);
        set.clear();
        assert_eq!(set.count(), 0);
    }

    #[test]
    fn notify_reaches_every_observer() {
        let set = ObserverSet::default();
        let a = Arc::new(CountingObserver {
            count: AtomicUsize::new(0),
        });
        let b = Arc::new(CountingObserver {
            count: AtomicUsize::new(0),
        });
        set.register(a.clone());
        set.register(b.clone());

        let event = JobEvent::Queued { job: 1, ticket: 0 };
        set.notify(&event);
        set.on_event(&event);

        assert_eq!(a.count.load(Ordering::Relaxed), 2);
        assert_eq!(b.count.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn notify_empty_does_not_panic() {
        ObserverSet::new().notify(&JobEvent::Failed {
            job: 1,
            reason: "bad".into(),
        });
    }
}
