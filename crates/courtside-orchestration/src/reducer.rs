//! Fan-in of per-worker results.
//!
//! Every worker sends exactly one message. The receivers below read exactly
//! `workers` messages, so they double as the completion barrier for a job.

use crossbeam_channel::Receiver;

use courtside_core::scorer::best_of;
use courtside_core::{ChartLayer, JobEvent, JobObserver, ScoredCandidate};

use crate::error::DispatchError;

/// A search worker's partial result.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalBest {
    /// Worker index.
    pub worker: usize,
    /// Best candidate in the worker's range, if any scored.
    pub best: Option<ScoredCandidate>,
    /// Candidates attempted.
    pub evaluated: usize,
    /// Candidates whose scoring failed.
    pub failed: usize,
}

/// A render worker's done signal, carrying its points.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDone {
    /// Worker index.
    pub worker: usize,
    /// Records examined.
    pub examined: usize,
    /// Points that passed the filters.
    pub layer: ChartLayer,
}

/// Reduced search result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    /// Global best candidate.
    pub best: Option<ScoredCandidate>,
    /// Candidates attempted across all workers.
    pub evaluated: usize,
    /// Failed scorings across all workers.
    pub failed: usize,
}

impl SearchResult {
    /// Fold one worker's report in.
    pub fn absorb(&mut self, local: LocalBest) {
        self.evaluated += local.evaluated;
        self.failed += local.failed;
        if let Some(candidate) = local.best {
            self.best = Some(best_of(self.best.take(), candidate));
        }
    }
}

/// Receive exactly `workers` search reports and keep the global best.
///
/// Strictly higher accuracy wins; ties go to the lower grid ordinal, so the
/// result does not depend on arrival order.
pub fn reduce_search(
    rx: &Receiver<LocalBest>,
    workers: usize,
    job: usize,
    observer: &dyn JobObserver,
) -> Result<SearchResult, DispatchError> {
    let mut result = SearchResult::default();
    for received in 0..workers {
        let local = rx.recv().map_err(|_| DispatchError::WorkerLost {
            expected: workers,
            received,
        })?;
        observer.on_event(&JobEvent::WorkerFinished {
            job,
            worker: local.worker,
            items: local.evaluated,
        });
        result.absorb(local);
    }
    Ok(result)
}

/// Receive exactly `workers` done signals and compose the layers in worker
/// order.
pub fn await_layers(
    rx: &Receiver<LayerDone>,
    workers: usize,
    job: usize,
    observer: &dyn JobObserver,
) -> Result<ChartLayer, DispatchError> {
    let mut slots: Vec<Option<ChartLayer>> = vec![None; workers];
    for received in 0..workers {
        let done = rx.recv().map_err(|_| DispatchError::WorkerLost {
            expected: workers,
            received,
        })?;
        observer.on_event(&JobEvent::WorkerFinished {
            job,
            worker: done.worker,
            items: done.examined,
        });
        if let Some(slot) = slots.get_mut(done.worker) {
            *slot = Some(done.layer);
        }
    }
    let mut chart = ChartLayer::default();
    for layer in slots.into_iter().flatten() {
        chart.merge(layer);
    }
    Ok(chart)
}
