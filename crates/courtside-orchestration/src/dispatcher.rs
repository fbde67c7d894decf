//! Partitioned fan-out of a single job.
//!
//! A render job splits the shot records, a search job splits its candidate
//! grid. Each range goes to one worker on the shared pool; workers keep their
//! partial result private and send it once on a per-job channel. In
//! sequential mode the single worker runs inline on the calling thread.

use std::num::NonZeroUsize;
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, warn};

use courtside_core::filter::matches_all;
use courtside_core::grid::expand_grid;
use courtside_core::scorer::best_of;
use courtside_core::{
    partition, Candidate, ChartLayer, FieldFilter, Job, JobEvent, JobKind, JobLine, JobObserver,
    NoOpObserver, Options, RenderJob, Renderer, ScoredCandidate, Scorer, SearchJob, ShotChart,
    ShotRecord,
};

use crate::error::DispatchError;
use crate::interfaces::JobOutcome;
use crate::reducer::{await_layers, reduce_search, LayerDone, LocalBest, SearchResult};

/// Plot the shots in `shots` that pass every filter.
#[must_use]
pub fn render_partition(shots: &[ShotRecord], filters: &[FieldFilter]) -> ChartLayer {
    let mut layer = ChartLayer::default();
    for shot in shots.iter().filter(|s| matches_all(filters, s)) {
        layer.plot(shot);
    }
    layer
}

/// Score every candidate in `candidates` and keep the local best.
pub fn search_partition(
    worker: usize,
    candidates: &[Candidate],
    scorer: &dyn Scorer,
    options: &Options,
) -> LocalBest {
    let mut best: Option<ScoredCandidate> = None;
    let mut failed = 0;
    for candidate in candidates {
        let accuracy = match scorer.score(candidate) {
            Ok(accuracy) => Some(accuracy),
            Err(err) => {
                failed += 1;
                warn!(
                    worker,
                    candidate = %candidate.value_string(),
                    error = %err,
                    "Scoring failed"
                );
                options.failure_policy.fallback()
            }
        };
        if let Some(accuracy) = accuracy {
            let scored = ScoredCandidate {
                candidate: candidate.clone(),
                accuracy,
            };
            best = Some(best_of(best, scored));
        }
    }
    LocalBest {
        worker,
        best,
        evaluated: candidates.len(),
        failed,
    }
}

/// Classifies jobs and runs them across the worker pool.
pub struct WorkerDispatcher {
    options: Options,
    shots: Arc<[ShotRecord]>,
    scorer: Arc<dyn Scorer>,
    renderer: Arc<dyn Renderer>,
    observer: Arc<dyn JobObserver>,
    pool: Option<ThreadPool>,
}

impl WorkerDispatcher {
    /// Create a dispatcher. In parallel mode this builds a pool with one
    /// thread per worker.
    pub fn new(
        options: Options,
        shots: impl Into<Arc<[ShotRecord]>>,
        scorer: Arc<dyn Scorer>,
        renderer: Arc<dyn Renderer>,
    ) -> Result<Self, DispatchError> {
        let pool = if options.mode.is_parallel() {
            Some(
                ThreadPoolBuilder::new()
                    .num_threads(options.mode.workers().get())
                    .thread_name(|i| format!("courtside-worker-{i}"))
                    .build()?,
            )
        } else {
            None
        };
        Ok(Self {
            options,
            shots: shots.into(),
            scorer,
            renderer,
            observer: Arc::new(NoOpObserver),
            pool,
        })
    }

    /// Replace the event observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn JobObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Runtime options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Event observer.
    #[must_use]
    pub fn observer(&self) -> &dyn JobObserver {
        self.observer.as_ref()
    }

    /// Number of workers each job is split across.
    #[must_use]
    pub fn workers(&self) -> NonZeroUsize {
        self.options.mode.workers()
    }

    /// Decode and run one job line. Failures become [`JobOutcome::Failed`].
    pub fn dispatch(&self, line: &JobLine) -> JobOutcome {
        let started = Instant::now();
        let result = line.decode().map_err(DispatchError::from).and_then(|job| {
            let kind = job.kind();
            let outcome = match job {
                Job::Render(render) => self.run_render(line.id, &render),
                Job::Search(search) => self.run_search(line.id, &search),
            };
            outcome.map(|outcome| (kind, outcome))
        });
        match result {
            Ok((kind, outcome)) => {
                self.observer.on_event(&JobEvent::Finished {
                    job: line.id,
                    kind,
                    elapsed: started.elapsed(),
                });
                outcome
            }
            Err(err) => self.fail(line.id, &err.to_string()),
        }
    }

    /// Report a job as failed and build its outcome.
    pub fn fail(&self, job: usize, reason: &str) -> JobOutcome {
        self.observer.on_event(&JobEvent::Failed {
            job,
            reason: reason.to_string(),
        });
        JobOutcome::Failed {
            job,
            reason: reason.to_string(),
        }
    }

    fn started(&self, job: usize, kind: JobKind, domain: usize) {
        self.observer.on_event(&JobEvent::Started {
            job,
            kind,
            workers: self.workers().get(),
            domain,
        });
    }

    fn run_render(&self, job: usize, render: &RenderJob) -> Result<JobOutcome, DispatchError> {
        self.started(job, JobKind::Render, self.shots.len());
        let layer = match &self.pool {
            None => {
                let layer = render_partition(&self.shots, &render.filters);
                self.observer.on_event(&JobEvent::WorkerFinished {
                    job,
                    worker: 0,
                    items: self.shots.len(),
                });
                layer
            }
            Some(pool) => self.render_parallel(pool, job, &render.filters)?,
        };
        let chart = ShotChart::new(&render.specs, layer);
        let path = chart.output_path(&self.options.output_dir);
        self.renderer.render(&chart, &path)?;
        Ok(JobOutcome::Rendered {
            job,
            title: chart.title,
            path,
            made: chart.layer.made.len(),
            missed: chart.layer.missed.len(),
        })
    }

    fn render_parallel(
        &self,
        pool: &ThreadPool,
        job: usize,
        filters: &[FieldFilter],
    ) -> Result<ChartLayer, DispatchError> {
        let ranges = partition(self.shots.len(), self.workers());
        let (tx, rx) = crossbeam_channel::bounded::<LayerDone>(ranges.len());
        let shots: &[ShotRecord] = &self.shots;
        pool.in_place_scope(|scope| {
            for (worker, range) in ranges.iter().cloned().enumerate() {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    debug!(job, worker, start = range.start, end = range.end, "Render worker");
                    let examined = range.len();
                    let layer = render_partition(&shots[range], filters);
                    let _ = tx.send(LayerDone {
                        worker,
                        examined,
                        layer,
                    });
                });
            }
            drop(tx);
            await_layers(&rx, ranges.len(), job, self.observer.as_ref())
        })
    }

    fn run_search(&self, job: usize, search: &SearchJob) -> Result<JobOutcome, DispatchError> {
        let candidates = expand_grid(search)?;
        self.started(job, JobKind::Search, candidates.len());
        let result = match &self.pool {
            None => {
                let local = search_partition(0, &candidates, self.scorer.as_ref(), &self.options);
                self.observer.on_event(&JobEvent::WorkerFinished {
                    job,
                    worker: 0,
                    items: local.evaluated,
                });
                let mut result = SearchResult::default();
                result.absorb(local);
                result
            }
            Some(pool) => self.search_parallel(pool, job, &candidates)?,
        };
        Ok(JobOutcome::Searched {
            job,
            model: search.model.clone(),
            best: result.best,
            evaluated: result.evaluated,
            failed: result.failed,
        })
    }

    fn search_parallel(
        &self,
        pool: &ThreadPool,
        job: usize,
        candidates: &[Candidate],
    ) -> Result<SearchResult, DispatchError> {
        let ranges: Vec<Range<usize>> = partition(candidates.len(), self.workers());
        let (tx, rx) = crossbeam_channel::bounded::<LocalBest>(ranges.len());
        let scorer = self.scorer.as_ref();
        let options = &self.options;
        pool.in_place_scope(|scope| {
            for (worker, range) in ranges.iter().cloned().enumerate() {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    debug!(job, worker, start = range.start, end = range.end, "Search worker");
                    let local = search_partition(worker, &candidates[range], scorer, options);
                    let _ = tx.send(local);
                });
            }
            drop(tx);
            reduce_search(&rx, ranges.len(), job, self.observer.as_ref())
        })
    }
}
