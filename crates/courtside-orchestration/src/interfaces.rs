//! Orchestration interfaces.

use std::path::PathBuf;
use std::time::Duration;

use parking_lot::Mutex;

use courtside_core::{JobKind, ScoredCandidate};

/// Final result of one job line.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// A chart was written.
    Rendered {
        /// Job id (input line number).
        job: usize,
        /// Chart title.
        title: String,
        /// File the chart was written to.
        path: PathBuf,
        /// Made shots plotted.
        made: usize,
        /// Missed shots plotted.
        missed: usize,
    },
    /// A parameter grid was searched.
    Searched {
        /// Job id (input line number).
        job: usize,
        /// Model identifier.
        model: String,
        /// Best candidate, or `None` when nothing scored.
        best: Option<ScoredCandidate>,
        /// Candidates attempted.
        evaluated: usize,
        /// Candidates whose scoring failed.
        failed: usize,
    },
    /// The job could not be run.
    Failed {
        /// Job id (input line number).
        job: usize,
        /// Human-readable reason.
        reason: String,
    },
}

impl JobOutcome {
    /// Job id.
    #[must_use]
    pub fn job(&self) -> usize {
        match self {
            Self::Rendered { job, .. } | Self::Searched { job, .. } | Self::Failed { job, .. } => {
                *job
            }
        }
    }

    /// Job class, when the job got far enough to have one.
    #[must_use]
    pub fn kind(&self) -> Option<JobKind> {
        match self {
            Self::Rendered { .. } => Some(JobKind::Render),
            Self::Searched { .. } => Some(JobKind::Search),
            Self::Failed { .. } => None,
        }
    }

    /// Whether the job failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Totals for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Job lines accepted (blank lines excluded).
    pub processed: usize,
    /// Charts written.
    pub rendered: usize,
    /// Searches completed.
    pub searched: usize,
    /// Jobs that failed, including lines rejected by the queue.
    pub failed: usize,
    /// Wall time of the whole run.
    pub elapsed: Duration,
}

impl RunSummary {
    /// Count one outcome.
    pub fn record(&mut self, outcome: &JobOutcome) {
        self.processed += 1;
        match outcome {
            JobOutcome::Rendered { .. } => self.rendered += 1,
            JobOutcome::Searched { .. } => self.searched += 1,
            JobOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Add another summary's counts. Elapsed time is not summed.
    pub fn merge(&mut self, other: &Self) {
        self.processed += other.processed;
        self.rendered += other.rendered;
        self.searched += other.searched;
        self.failed += other.failed;
    }

    /// Whether any job failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Trait for presenting results to the user.
///
/// Called concurrently from every reader thread.
pub trait ResultPresenter: Send + Sync {
    /// Present one job's outcome.
    fn present_outcome(&self, outcome: &JobOutcome);

    /// Present the totals once the run is over.
    fn present_summary(&self, summary: &RunSummary);
}

/// Presenter that records outcomes in memory.
#[derive(Debug, Default)]
pub struct CollectingPresenter {
    outcomes: Mutex<Vec<JobOutcome>>,
    summary: Mutex<Option<RunSummary>>,
}

impl CollectingPresenter {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcomes seen so far, sorted by job id.
    #[must_use]
    pub fn outcomes(&self) -> Vec<JobOutcome> {
        let mut outcomes = self.outcomes.lock().clone();
        outcomes.sort_by_key(JobOutcome::job);
        outcomes
    }

    /// Summary, once presented.
    #[must_use]
    pub fn summary(&self) -> Option<RunSummary> {
        *self.summary.lock()
    }
}

impl ResultPresenter for CollectingPresenter {
    fn present_outcome(&self, outcome: &JobOutcome) {
        self.outcomes.lock().push(outcome.clone());
    }

    fn present_summary(&self, summary: &RunSummary) {
        *self.summary.lock() = Some(*summary);
    }
}
