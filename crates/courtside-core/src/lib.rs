//! # courtside-core
//!
//! Core library for the Courtside job runner: decoding job lines, filtering
//! shot records, expanding hyperparameter grids, partitioning work domains,
//! and the scoring and rendering collaborators the workers call into.
#![warn(missing_docs)]

pub mod constants;
pub mod error;
pub mod events;
pub mod filter;
pub mod grid;
pub mod job;
pub mod observer;
pub mod observers;
pub mod options;
pub mod partition;
pub mod render;
pub mod scorer;
pub mod shot;

// Re-exports
pub use constants::{exit_codes, DEFAULT_QUEUE_CAPACITY, MAX_GRID_CANDIDATES, READERS_PER_WORKER};
pub use error::CoreError;
pub use events::JobEvent;
pub use filter::FieldFilter;
pub use grid::{expand_grid, Candidate, ParamValue};
pub use job::{Dimension, Job, JobError, JobKind, JobLine, RenderJob, SearchJob};
pub use observer::{JobObserver, ObserverSet};
pub use observers::{ChannelObserver, LoggingObserver, NoOpObserver};
pub use options::{ExecutionMode, Options};
pub use partition::partition;
pub use render::{ChartLayer, PngRenderer, RenderError, Renderer, ShotChart};
pub use scorer::{ProcessScorer, ScoredCandidate, Scorer, ScoringError, ScoringFailurePolicy};
pub use shot::{load_shots, ShotRecord};
