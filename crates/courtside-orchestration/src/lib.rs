//! # courtside-orchestration
//!
//! Reader pool, partitioned worker dispatch and result reduction.
//!
//! Job lines flow from a producer into a lock-free ticket queue, readers
//! drain the queue and hand each job to the [`WorkerDispatcher`], which
//! splits the job's domain into contiguous ranges, runs one worker per range
//! and folds the workers' reports back into a single outcome.

pub mod dispatcher;
pub mod error;
pub mod interfaces;
pub mod reader;
pub mod reducer;

pub use dispatcher::WorkerDispatcher;
pub use error::DispatchError;
pub use interfaces::{CollectingPresenter, JobOutcome, ResultPresenter, RunSummary};
pub use reader::{run, DrainLedger, JobFeed};
pub use reducer::{LayerDone, LocalBest, SearchResult};
