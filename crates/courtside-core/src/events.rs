//! Job lifecycle events.

use std::time::Duration;

use crate::job::JobKind;

/// Something that happened to a job, identified by its input line number.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// The line was accepted by the queue.
    Queued {
        /// Job id.
        job: usize,
        /// Queue ticket.
        ticket: usize,
    },
    /// A reader decoded the job and is fanning it out.
    Started {
        /// Job id.
        job: usize,
        /// Job class.
        kind: JobKind,
        /// Number of workers.
        workers: usize,
        /// Size of the partitioned domain (shots or candidates).
        domain: usize,
    },
    /// One worker reported its partial result.
    WorkerFinished {
        /// Job id.
        job: usize,
        /// Worker index.
        worker: usize,
        /// Items processed by that worker.
        items: usize,
    },
    /// All workers reported and the result was produced.
    Finished {
        /// Job id.
        job: usize,
        /// Job class.
        kind: JobKind,
        /// Wall time from start to result.
        elapsed: Duration,
    },
    /// The job could not be run.
    Failed {
        /// Job id.
        job: usize,
        /// Human-readable reason.
        reason: String,
    },
}

impl JobEvent {
    /// Id of the job the event belongs to.
    #[must_use]
    pub fn job(&self) -> usize {
        match self {
            Self::Queued { job, .. }
            | Self::Started { job, .. }
            | Self::WorkerFinished { job, .. }
            | Self::Finished { job, .. }
            | Self::Failed { job, .. } => *job,
        }
    }

    /// Whether the job has reached a final state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished { .. } | Self::Failed { .. })
    }
}
