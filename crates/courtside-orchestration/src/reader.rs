//! Reader pool and producer.
//!
//! The producer streams job lines into a [`TicketQueue`]; reader threads
//! dequeue them and hand each one to the [`WorkerDispatcher`]. The queue
//! itself never tells a consumer to stop, so readers coordinate through a
//! [`DrainLedger`]: a reader only calls the blocking `dequeue` after claiming
//! an issued ticket, and exits once the producer has sealed the ledger and
//! every ticket has been claimed.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use crossbeam::utils::Backoff;
use tracing::{debug, info};

use courtside_core::{JobError, JobEvent, JobLine};
use courtside_queue::TicketQueue;

use crate::dispatcher::WorkerDispatcher;
use crate::error::DispatchError;
use crate::interfaces::{JobOutcome, ResultPresenter, RunSummary};

/// Result of a claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// A ticket was claimed; `dequeue` will find a payload.
    Granted,
    /// Nothing to claim yet, but the producer may still enqueue.
    Pending,
    /// The producer is done and every ticket has been claimed.
    Drained,
}

/// Consumption accounting shared by the readers of one queue.
#[derive(Debug, Default)]
pub struct DrainLedger {
    claimed: AtomicUsize,
    sealed: AtomicBool,
}

impl DrainLedger {
    /// Create an open ledger with nothing claimed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim one of the tickets issued by `queue`.
    pub fn claim<T>(&self, queue: &TicketQueue<T>) -> Claim {
        // Read the seal first: once it is observed, every enqueue is visible.
        let sealed = self.sealed.load(Ordering::Acquire);
        let issued = queue.tickets_issued();
        let granted = self
            .claimed
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |claimed| {
                (claimed < issued).then_some(claimed + 1)
            })
            .is_ok();
        match (granted, sealed) {
            (true, _) => Claim::Granted,
            (false, true) => Claim::Drained,
            (false, false) => Claim::Pending,
        }
    }

    /// Mark the producer as finished.
    pub fn seal(&self) {
        self.sealed.store(true, Ordering::Release);
    }

    /// Whether the producer has finished.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// Tickets claimed so far.
    #[must_use]
    pub fn claimed(&self) -> usize {
        self.claimed.load(Ordering::Acquire)
    }
}

/// Queue plus ledger, shared by the producer and the readers.
#[derive(Debug)]
pub struct JobFeed {
    queue: TicketQueue<JobLine>,
    ledger: DrainLedger,
}

impl JobFeed {
    /// Create a feed backed by a queue of `capacity` slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: TicketQueue::with_capacity(capacity),
            ledger: DrainLedger::new(),
        }
    }

    /// Underlying queue.
    #[must_use]
    pub fn queue(&self) -> &TicketQueue<JobLine> {
        &self.queue
    }

    /// Consumption ledger.
    #[must_use]
    pub fn ledger(&self) -> &DrainLedger {
        &self.ledger
    }

    /// Next job line, or `None` once the feed is sealed and drained.
    ///
    /// Busy-waits while the feed is open and empty.
    pub fn next(&self) -> Option<JobLine> {
        let backoff = Backoff::new();
        loop {
            match self.ledger.claim(&self.queue) {
                Claim::Granted => return Some(self.queue.dequeue()),
                Claim::Drained => return None,
                Claim::Pending => backoff.snooze(),
            }
        }
    }
}

/// Drain `feed` on the current thread, dispatching every line.
pub fn drain(
    feed: &JobFeed,
    dispatcher: &WorkerDispatcher,
    presenter: &dyn ResultPresenter,
) -> RunSummary {
    let mut summary = RunSummary::default();
    while let Some(line) = feed.next() {
        debug!(job = line.id, "Dequeued job");
        let outcome = dispatcher.dispatch(&line);
        presenter.present_outcome(&outcome);
        summary.record(&outcome);
    }
    summary
}

/// Enqueue every non-blank line of `input`, then seal the feed.
///
/// Lines that are not valid UTF-8 and lines the queue rejects are reported as
/// failures right away. The feed is sealed even when reading fails, so readers
/// always terminate.
pub fn produce(
    input: impl BufRead,
    feed: &JobFeed,
    dispatcher: &WorkerDispatcher,
    presenter: &dyn ResultPresenter,
) -> Result<RunSummary, DispatchError> {
    let result = enqueue_lines(input, feed, dispatcher, presenter);
    feed.ledger.seal();
    result
}

fn enqueue_lines(
    input: impl BufRead,
    feed: &JobFeed,
    dispatcher: &WorkerDispatcher,
    presenter: &dyn ResultPresenter,
) -> Result<RunSummary, DispatchError> {
    let mut rejected = RunSummary::default();
    let mut report = |id: usize, reason: String| {
        let outcome = dispatcher.fail(id, &reason);
        presenter.present_outcome(&outcome);
        rejected.record(&outcome);
    };
    for (index, raw) in input.split(b'\n').enumerate() {
        let id = index + 1;
        let text = match decode_line(raw?) {
            Ok(text) => text,
            Err(err) => {
                report(id, err.to_string());
                continue;
            }
        };
        if text.trim().is_empty() {
            continue;
        }
        match feed.queue.enqueue(JobLine::new(id, text)) {
            Ok(ticket) => dispatcher
                .observer()
                .on_event(&JobEvent::Queued { job: id, ticket }),
            Err(full) => report(id, full.to_string()),
        }
    }
    Ok(rejected)
}

/// Decode one raw line, dropping its `\r\n` or `\n` terminator.
fn decode_line(mut raw: Vec<u8>) -> Result<String, JobError> {
    if raw.last() == Some(&b'\r') {
        raw.pop();
    }
    String::from_utf8(raw).map_err(|err| JobError::Malformed {
        line: String::from_utf8_lossy(err.as_bytes()).into_owned(),
        reason: format!("line is not valid UTF-8: {}", err.utf8_error()),
    })
}

/// Run every job line of `input` and present the results.
///
/// Sequential mode enqueues the whole input and then drains it inline.
/// Parallel mode starts `ceil(workers / 5)` reader threads, waits for each to
/// acknowledge it is running, and streams the input while they drain.
pub fn run(
    input: impl BufRead,
    dispatcher: &WorkerDispatcher,
    presenter: &dyn ResultPresenter,
) -> Result<RunSummary, DispatchError> {
    let started = Instant::now();
    let options = dispatcher.options();
    let feed = JobFeed::with_capacity(options.queue_capacity);
    info!(mode = %options.mode, capacity = options.queue_capacity, "Starting run");

    let mut summary = if options.mode.is_parallel() {
        run_parallel(input, &feed, dispatcher, presenter)?
    } else {
        let produced = produce(input, &feed, dispatcher, presenter);
        let mut summary = drain(&feed, dispatcher, presenter);
        summary.merge(&produced?);
        summary
    };

    summary.elapsed = started.elapsed();
    let stats = feed.queue.stats();
    debug!(
        enqueued = stats.enqueued,
        dequeued = stats.dequeued,
        rejected = stats.rejected,
        empty_scans = stats.empty_scans,
        "Queue statistics"
    );
    presenter.present_summary(&summary);
    Ok(summary)
}

fn run_parallel(
    input: impl BufRead,
    feed: &JobFeed,
    dispatcher: &WorkerDispatcher,
    presenter: &dyn ResultPresenter,
) -> Result<RunSummary, DispatchError> {
    let readers = dispatcher.options().mode.readers().get();
    let (ready_tx, ready_rx) = crossbeam_channel::bounded::<usize>(readers);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..readers)
            .map(|reader| {
                let ready_tx = ready_tx.clone();
                std::thread::Builder::new()
                    .name(format!("courtside-reader-{reader}"))
                    .spawn_scoped(scope, move || {
                        let _ = ready_tx.send(reader);
                        drop(ready_tx);
                        drain(feed, dispatcher, presenter)
                    })
            })
            .collect::<Result<_, _>>()
            .inspect_err(|_| feed.ledger.seal())?;
        drop(ready_tx);

        for _ in 0..readers {
            match ready_rx.recv() {
                Ok(reader) => debug!(reader, "Reader ready"),
                Err(_) => break,
            }
        }

        let produced = produce(input, feed, dispatcher, presenter);

        let mut summary = RunSummary::default();
        for handle in handles {
            match handle.join() {
                Ok(local) => summary.merge(&local),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        summary.merge(&produced?);
        Ok(summary)
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::num::NonZeroUsize;
    use std::path::Path;
    use std::sync::Arc;

    use courtside_core::render::RenderError;
    use courtside_core::{
        Candidate, ExecutionMode, Options, Renderer, ScoringError, Scorer, ShotChart,
    };

    use super::*;
    use crate::interfaces::CollectingPresenter;

    struct OrdinalScorer;

    impl Scorer for OrdinalScorer {
        #[allow(clippy::cast_precision_loss)]
        fn score(&self, candidate: &Candidate) -> Result<f64, ScoringError> {
            Ok(candidate.ordinal as f64 / 100.0)
        }
    }

    struct NullRenderer;

    impl Renderer for NullRenderer {
        fn render(&self, _chart: &ShotChart, _path: &Path) -> Result<(), RenderError> {
            Ok(())
        }
    }

    fn dispatcher(mode: ExecutionMode, capacity: usize) -> WorkerDispatcher {
        let options = Options {
            mode,
            queue_capacity: capacity,
            ..Options::default()
        };
        WorkerDispatcher::new(
            options,
            Vec::new(),
            Arc::new(OrdinalScorer),
            Arc::new(NullRenderer),
        )
        .unwrap()
    }

    fn parallel(n: usize) -> ExecutionMode {
        ExecutionMode::Parallel {
            workers: NonZeroUsize::new(n).unwrap(),
        }
    }

    fn search_lines(count: usize) -> String {
        (0..count)
            .map(|i| {
                format!(
                    r#"{{"command": "ml", "model": "m{i}", "params": ["a"], "param_range": [[0, 3]]}}"#
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn ledger_grants_only_issued_tickets() {
        let queue = TicketQueue::with_capacity(4);
        let ledger = DrainLedger::new();
        assert_eq!(ledger.claim(&queue), Claim::Pending);
        queue.enqueue(1).unwrap();
        assert_eq!(ledger.claim(&queue), Claim::Granted);
        assert_eq!(ledger.claim(&queue), Claim::Pending);
        ledger.seal();
        assert_eq!(ledger.claim(&queue), Claim::Drained);
        assert_eq!(ledger.claimed(), 1);
        assert!(ledger.is_sealed());
    }

    #[test]
    fn sealed_ledger_still_grants_unclaimed_tickets() {
        let queue = TicketQueue::with_capacity(4);
        queue.enqueue(1).unwrap();
        queue.enqueue(2).unwrap();
        let ledger = DrainLedger::new();
        ledger.seal();
        assert_eq!(ledger.claim(&queue), Claim::Granted);
        assert_eq!(ledger.claim(&queue), Claim::Granted);
        assert_eq!(ledger.claim(&queue), Claim::Drained);
    }

    #[test]
    fn feed_yields_every_line_then_stops() {
        let feed = JobFeed::with_capacity(8);
        feed.queue().enqueue(JobLine::new(1, "a")).unwrap();
        feed.queue().enqueue(JobLine::new(2, "b")).unwrap();
        feed.ledger().seal();
        assert_eq!(feed.next().unwrap().id, 1);
        assert_eq!(feed.next().unwrap().id, 2);
        assert!(feed.next().is_none());
    }

    #[test]
    fn sequential_run_processes_every_line() {
        let d = dispatcher(ExecutionMode::Sequential, 64);
        let presenter = CollectingPresenter::new();
        let summary = run(Cursor::new(search_lines(5)), &d, &presenter).unwrap();
        assert_eq!(summary.processed, 5);
        assert_eq!(summary.searched, 5);
        assert_eq!(presenter.outcomes().len(), 5);
        assert!(presenter.summary().is_some());
    }

    #[test]
    fn parallel_run_processes_every_line_once() {
        for workers in [1, 4, 11] {
            let d = dispatcher(parallel(workers), 256);
            let presenter = CollectingPresenter::new();
            let summary = run(Cursor::new(search_lines(40)), &d, &presenter).unwrap();
            assert_eq!(summary.processed, 40, "p={workers}");
            let ids: Vec<usize> = presenter.outcomes().iter().map(JobOutcome::job).collect();
            assert_eq!(ids, (1..=40).collect::<Vec<_>>());
        }
    }

    #[test]
    fn blank_lines_are_skipped_but_keep_numbering() {
        let d = dispatcher(parallel(2), 16);
        let presenter = CollectingPresenter::new();
        let input = format!("\n{}\n   \n{}\n", search_lines(1), search_lines(1));
        let summary = run(Cursor::new(input), &d, &presenter).unwrap();
        assert_eq!(summary.processed, 2);
        let ids: Vec<usize> = presenter.outcomes().iter().map(JobOutcome::job).collect();
        assert_eq!(ids, [2, 4]);
    }

    #[test]
    fn overflow_is_reported_per_line() {
        let d = dispatcher(parallel(3), 3);
        let presenter = CollectingPresenter::new();
        let summary = run(Cursor::new(search_lines(5)), &d, &presenter).unwrap();
        assert_eq!(summary.processed, 5);
        assert_eq!(summary.searched, 3);
        assert_eq!(summary.failed, 2);
        let outcomes = presenter.outcomes();
        assert!(outcomes[3].is_failure());
        assert!(outcomes[4].is_failure());
    }

    #[test]
    fn undecodable_line_fails_alone() {
        let line = search_lines(1);
        let mut input = format!("{line}\n").into_bytes();
        input.extend_from_slice(b"\xff\xfe garbage\n");
        input.extend_from_slice(format!("{line}\r\n").as_bytes());

        for mode in [ExecutionMode::Sequential, parallel(3)] {
            let d = dispatcher(mode, 16);
            let presenter = CollectingPresenter::new();
            let summary = run(Cursor::new(input.clone()), &d, &presenter).unwrap();
            assert_eq!(summary.processed, 3, "mode {mode}");
            assert_eq!(summary.searched, 2);
            assert_eq!(summary.failed, 1);
            let outcomes = presenter.outcomes();
            let failed: Vec<usize> = outcomes
                .iter()
                .filter(|o| o.is_failure())
                .map(JobOutcome::job)
                .collect();
            assert_eq!(failed, [2]);
        }
    }

    struct BrokenPipe;

    impl std::io::Read for BrokenPipe {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("pipe closed"))
        }
    }

    #[test]
    fn read_error_still_drains_queued_lines() {
        use std::io::Read;

        let d = dispatcher(ExecutionMode::Sequential, 16);
        let presenter = CollectingPresenter::new();
        let input = Cursor::new(format!("{}\n", search_lines(2))).chain(BrokenPipe);
        let result = run(std::io::BufReader::new(input), &d, &presenter);
        assert!(matches!(result, Err(DispatchError::Input(_))));
        assert_eq!(presenter.outcomes().len(), 2);
    }

    #[test]
    fn empty_input_finishes() {
        let d = dispatcher(parallel(6), 4);
        let presenter = CollectingPresenter::new();
        let summary = run(Cursor::new(""), &d, &presenter).unwrap();
        assert_eq!(summary.processed, 0);
    }
}
