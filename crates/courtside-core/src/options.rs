//! Execution mode and runtime options.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{DEFAULT_OUTPUT_DIR, DEFAULT_QUEUE_CAPACITY, READERS_PER_WORKER};
use crate::scorer::ScoringFailurePolicy;

/// How jobs are executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One inline reader, one worker per job, no thread pool.
    #[default]
    Sequential,
    /// A worker pool of the given size and `ceil(workers / 5)` readers.
    Parallel {
        /// Worker count per job and pool size.
        workers: NonZeroUsize,
    },
}

impl ExecutionMode {
    /// Workers each job is split across.
    #[must_use]
    pub fn workers(self) -> NonZeroUsize {
        match self {
            Self::Sequential => NonZeroUsize::MIN,
            Self::Parallel { workers } => workers,
        }
    }

    /// Reader threads draining the queue.
    #[must_use]
    pub fn readers(self) -> NonZeroUsize {
        match self {
            Self::Sequential => NonZeroUsize::MIN,
            Self::Parallel { workers } => NonZeroUsize::new(workers.get().div_ceil(READERS_PER_WORKER))
                .unwrap_or(NonZeroUsize::MIN),
        }
    }

    /// Whether jobs run on a worker pool.
    #[must_use]
    pub fn is_parallel(self) -> bool {
        matches!(self, Self::Parallel { .. })
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    /// Parse `p=<n>` with `n >= 1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count = s
            .strip_prefix("p=")
            .ok_or_else(|| format!("expected `p=<workers>`, got `{s}`"))?;
        let workers: usize = count
            .parse()
            .map_err(|_| format!("worker count `{count}` is not a positive integer"))?;
        NonZeroUsize::new(workers)
            .map(|workers| Self::Parallel { workers })
            .ok_or_else(|| "worker count must be at least 1".to_string())
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => f.write_str("sequential"),
            Self::Parallel { workers } => write!(f, "p={workers}"),
        }
    }
}

/// Runtime options shared by the reader pool and the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Execution mode.
    pub mode: ExecutionMode,
    /// Job queue slot count (0 = default).
    pub queue_capacity: usize,
    /// What to do with candidates whose scoring failed.
    pub failure_policy: ScoringFailurePolicy,
    /// Directory that receives rendered charts.
    pub output_dir: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            failure_policy: ScoringFailurePolicy::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl Options {
    /// Normalize options, applying defaults where values are unset.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if self.queue_capacity == 0 {
            self.queue_capacity = DEFAULT_QUEUE_CAPACITY;
        }
        if self.output_dir.as_os_str().is_empty() {
            self.output_dir = PathBuf::from(DEFAULT_OUTPUT_DIR);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parallel(n: usize) -> ExecutionMode {
        ExecutionMode::Parallel {
            workers: NonZeroUsize::new(n).unwrap(),
        }
    }

    #[test]
    fn parse_parallel_mode() {
        assert_eq!("p=4".parse(), Ok(parallel(4)));
        assert_eq!("p=1".parse(), Ok(parallel(1)));
    }

    #[test]
    fn reject_malformed_modes() {
        for bad in ["p=0", "p=", "p=-1", "p=two", "4", "q=4", "P=4", ""] {
            assert!(bad.parse::<ExecutionMode>().is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn reader_count_is_ceiling_of_fifth() {
        assert_eq!(parallel(1).readers().get(), 1);
        assert_eq!(parallel(5).readers().get(), 1);
        assert_eq!(parallel(6).readers().get(), 2);
        assert_eq!(parallel(11).readers().get(), 3);
        assert_eq!(ExecutionMode::Sequential.readers().get(), 1);
    }

    #[test]
    fn sequential_uses_one_worker() {
        assert_eq!(ExecutionMode::Sequential.workers().get(), 1);
        assert!(!ExecutionMode::Sequential.is_parallel());
        assert!(parallel(3).is_parallel());
    }

    #[test]
    fn display_round_trips() {
        assert_eq!(parallel(8).to_string(), "p=8");
        assert_eq!("p=8".parse::<ExecutionMode>().unwrap(), parallel(8));
        assert_eq!(ExecutionMode::Sequential.to_string(), "sequential");
    }

    #[test]
    fn normalize_fills_defaults() {
        let opts = Options {
            queue_capacity: 0,
            output_dir: PathBuf::new(),
            ..Options::default()
        }
        .normalize();
        assert_eq!(opts.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(opts.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(opts.failure_policy, ScoringFailurePolicy::Exclude);
    }
}
