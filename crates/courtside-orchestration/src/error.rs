//! Dispatch errors.

use courtside_core::{JobError, RenderError};

/// Error type for job dispatch and run setup.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The job line could not be turned into runnable work.
    #[error(transparent)]
    Job(#[from] JobError),

    /// The chart could not be written.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Fewer worker reports arrived than workers were started.
    #[error("expected {expected} worker reports, received {received}")]
    WorkerLost {
        /// Workers started.
        expected: usize,
        /// Reports received before the channel closed.
        received: usize,
    },

    /// The worker pool could not be created.
    #[error("failed to create worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    /// Reading job lines failed.
    #[error("failed to read job input: {0}")]
    Input(#[from] std::io::Error),
}
