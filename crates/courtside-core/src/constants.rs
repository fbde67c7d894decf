//! Constants for queue sizing, reader fan-out, chart geometry and defaults.

/// Default slot count of the job queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// One reader thread is started per this many workers (rounded up).
pub const READERS_PER_WORKER: usize = 5;

/// Upper bound on the number of candidates a single search job may expand to.
pub const MAX_GRID_CANDIDATES: usize = 1_000_000;

/// Default location of the shot data set.
pub const DEFAULT_DATA_PATH: &str = "data/data.json";

/// Default directory that receives rendered charts.
pub const DEFAULT_OUTPUT_DIR: &str = "visualizationResults";

/// Default scoring command; candidate arguments are appended to it.
pub const DEFAULT_SCORER_COMMAND: &str = "python src/ml.py";

/// Chart name used when a render job carries no filter specs.
pub const DEFAULT_CHART_NAME: &str = "All_Shots";

/// Rendered chart width in pixels.
pub const CHART_WIDTH: u32 = 700;

/// Rendered chart height in pixels.
pub const CHART_HEIGHT: u32 = 500;

/// Exit codes returned by the `courtside` binary.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// Invalid command line (clap uses the same code).
    pub const ERROR_USAGE: i32 = 2;
    /// Invalid configuration or unreadable data set.
    pub const ERROR_CONFIG: i32 = 4;
    /// The batch ran but at least one job failed.
    pub const ERROR_JOB_FAILURES: i32 = 5;
}
