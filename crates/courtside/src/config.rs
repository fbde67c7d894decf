//! Application configuration from CLI flags and environment.

use std::path::PathBuf;

use clap::Parser;

use courtside_core::constants::{
    DEFAULT_DATA_PATH, DEFAULT_OUTPUT_DIR, DEFAULT_QUEUE_CAPACITY, DEFAULT_SCORER_COMMAND,
};
use courtside_core::{ExecutionMode, Options, ScoringFailurePolicy};

/// Courtside: run shot chart and hyperparameter search jobs read from stdin.
#[derive(Parser, Debug)]
#[command(name = "courtside", version, about)]
pub struct AppConfig {
    /// Execution mode: `p=<workers>` runs jobs in parallel; omit for sequential.
    #[arg(value_name = "MODE")]
    pub mode: Option<ExecutionMode>,

    /// Shot data set (JSON array of shot records).
    #[arg(long, default_value = DEFAULT_DATA_PATH, env = "COURTSIDE_DATA")]
    pub data: PathBuf,

    /// Directory that receives rendered charts.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR, env = "COURTSIDE_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Scoring command; model, parameter names and values are appended.
    #[arg(long, default_value = DEFAULT_SCORER_COMMAND, env = "COURTSIDE_SCORER")]
    pub scorer: String,

    /// What to do with candidates whose scoring fails: exclude or zero.
    #[arg(long, default_value = "exclude", env = "COURTSIDE_SCORE_FAILURE")]
    pub on_score_failure: ScoringFailurePolicy,

    /// Job queue capacity; lines beyond it are rejected.
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY, env = "COURTSIDE_QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode (only job results and errors).
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Execution mode, sequential when no `MODE` was given.
    #[must_use]
    pub fn execution_mode(&self) -> ExecutionMode {
        self.mode.unwrap_or_default()
    }

    /// Normalized runtime options.
    #[must_use]
    pub fn options(&self) -> Options {
        Options {
            mode: self.execution_mode(),
            queue_capacity: self.queue_capacity,
            failure_policy: self.on_score_failure,
            output_dir: self.output_dir.clone(),
        }
        .normalize()
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use clap::error::ErrorKind;

    use super::*;

    fn parse(args: &[&str]) -> Result<AppConfig, clap::Error> {
        AppConfig::try_parse_from(std::iter::once("courtside").chain(args.iter().copied()))
    }

    #[test]
    fn no_mode_is_sequential() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.execution_mode(), ExecutionMode::Sequential);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.on_score_failure, ScoringFailurePolicy::Exclude);
    }

    #[test]
    fn parallel_mode() {
        let config = parse(&["p=6"]).unwrap();
        assert_eq!(
            config.execution_mode(),
            ExecutionMode::Parallel {
                workers: NonZeroUsize::new(6).unwrap()
            }
        );
        assert_eq!(config.options().mode.readers().get(), 2);
    }

    #[test]
    fn malformed_mode_is_usage_error() {
        for bad in ["p=0", "p=x", "6", "threads=6"] {
            let err = parse(&[bad]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "{bad}");
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn two_modes_are_rejected() {
        let err = parse(&["p=2", "p=3"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn flags_map_to_options() {
        let config = parse(&[
            "p=2",
            "--queue-capacity",
            "0",
            "--on-score-failure",
            "zero",
            "--output-dir",
            "charts",
        ])
        .unwrap();
        let options = config.options();
        assert_eq!(options.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(options.failure_policy, ScoringFailurePolicy::Zero);
        assert_eq!(options.output_dir, PathBuf::from("charts"));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(parse(&["-q", "-v"]).is_err());
    }
}
