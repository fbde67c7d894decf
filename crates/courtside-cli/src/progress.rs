//! Spinner fed by job events.

use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{select, Receiver, Sender};
use indicatif::{ProgressBar, ProgressStyle};

use courtside_core::JobEvent;

/// Running counts shown next to the spinner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressCounts {
    /// Lines accepted by the queue.
    pub queued: usize,
    /// Jobs currently being fanned out.
    pub running: usize,
    /// Jobs finished successfully.
    pub finished: usize,
    /// Jobs that failed.
    pub failed: usize,
}

impl ProgressCounts {
    /// Apply one event.
    pub fn apply(&mut self, event: &JobEvent) {
        match event {
            JobEvent::Queued { .. } => self.queued += 1,
            JobEvent::Started { .. } => self.running += 1,
            JobEvent::WorkerFinished { .. } => {}
            JobEvent::Finished { .. } => {
                self.running = self.running.saturating_sub(1);
                self.finished += 1;
            }
            JobEvent::Failed { .. } => {
                self.running = self.running.saturating_sub(1);
                self.failed += 1;
            }
        }
    }

    /// Spinner message.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "{} queued, {} running, {} done, {} failed",
            self.queued, self.running, self.finished, self.failed
        )
    }
}

/// Spinner on stderr, updated from a background thread.
pub struct ProgressDisplay {
    stop: Sender<()>,
    handle: JoinHandle<ProgressCounts>,
}

impl ProgressDisplay {
    /// Start consuming `events`.
    #[must_use]
    pub fn start(events: Receiver<JobEvent>) -> Self {
        let (stop, stopped) = crossbeam_channel::bounded::<()>(1);
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} [{elapsed}] {msg}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(120));
        let handle = std::thread::spawn(move || {
            let mut counts = ProgressCounts::default();
            loop {
                select! {
                    recv(events) -> event => match event {
                        Ok(event) => {
                            counts.apply(&event);
                            bar.set_message(counts.message());
                        }
                        Err(_) => break,
                    },
                    recv(stopped) -> _ => break,
                }
            }
            for event in events.try_iter() {
                counts.apply(&event);
            }
            bar.finish_and_clear();
            counts
        });
        Self { stop, handle }
    }

    /// Stop the spinner and return the final counts.
    pub fn finish(self) -> ProgressCounts {
        let _ = self.stop.send(());
        self.handle.join().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use courtside_core::JobKind;

    use super::*;

    #[test]
    fn counts_follow_lifecycle() {
        let mut counts = ProgressCounts::default();
        counts.apply(&JobEvent::Queued { job: 1, ticket: 0 });
        counts.apply(&JobEvent::Queued { job: 2, ticket: 1 });
        counts.apply(&JobEvent::Started {
            job: 1,
            kind: JobKind::Search,
            workers: 2,
            domain: 4,
        });
        assert_eq!(counts.running, 1);
        counts.apply(&JobEvent::Finished {
            job: 1,
            kind: JobKind::Search,
            elapsed: Duration::ZERO,
        });
        counts.apply(&JobEvent::Failed {
            job: 2,
            reason: "bad".into(),
        });
        assert_eq!(
            counts,
            ProgressCounts {
                queued: 2,
                running: 0,
                finished: 1,
                failed: 1
            }
        );
        assert_eq!(counts.message(), "2 queued, 0 running, 1 done, 1 failed");
    }

    #[test]
    fn display_drains_pending_events_on_finish() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let display = ProgressDisplay::start(rx);
        tx.send(JobEvent::Queued { job: 1, ticket: 0 }).unwrap();
        tx.send(JobEvent::Queued { job: 2, ticket: 1 }).unwrap();
        let counts = display.finish();
        assert_eq!(counts.queued, 2);
    }

    #[test]
    fn display_stops_when_senders_drop() {
        let (tx, rx) = crossbeam_channel::unbounded::<JobEvent>();
        let display = ProgressDisplay::start(rx);
        drop(tx);
        assert_eq!(display.finish(), ProgressCounts::default());
    }
}
