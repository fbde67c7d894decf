//! Concrete observer implementations.

use crossbeam_channel::Sender;
use tracing::{debug, info, warn};

use crate::events::JobEvent;
use crate::observer::JobObserver;

/// Observer that forwards events through a channel (non-blocking).
///
/// Events are dropped when the channel is full or disconnected.
pub struct ChannelObserver {
    sender: Sender<JobEvent>,
}

impl ChannelObserver {
    /// Create a new channel observer.
    #[must_use]
    pub fn new(sender: Sender<JobEvent>) -> Self {
        Self { sender }
    }
}

impl JobObserver for ChannelObserver {
    fn on_event(&self, event: &JobEvent) {
        let _ = self.sender.try_send(event.clone());
    }
}

/// Observer that turns events into tracing records.
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl JobObserver for LoggingObserver {
    fn on_event(&self, event: &JobEvent) {
        match event {
            JobEvent::Queued { job, ticket } => debug!(job, ticket, "Job queued"),
            JobEvent::Started {
                job,
                kind,
                workers,
                domain,
            } => info!(job, %kind, workers, domain, "Job started"),
            JobEvent::WorkerFinished { job, worker, items } => {
                debug!(job, worker, items, "Worker finished");
            }
            JobEvent::Finished { job, kind, elapsed } => {
                info!(job, %kind, elapsed_ms = elapsed.as_millis(), "Job finished");
            }
            JobEvent::Failed { job, reason } => warn!(job, %reason, "Job failed"),
        }
    }
}

/// Null object: discards every event.
#[derive(Debug, Default)]
pub struct NoOpObserver;

impl JobObserver for NoOpObserver {
    fn on_event(&self, _event: &JobEvent) {}
}
