//! Candidate scoring.
//!
//! A [`Scorer`] turns one grid candidate into an accuracy value. The default
//! implementation, [`ProcessScorer`], runs an external program once per
//! candidate and reads the accuracy from its standard output.

use std::fmt;
use std::process::Command;
use std::str::FromStr;

use tracing::debug;

use crate::error::CoreError;
use crate::grid::Candidate;

/// Error type for a failed scoring invocation.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// The scoring program could not be started.
    #[error("failed to start scorer `{program}`: {source}")]
    Spawn {
        /// Program that was launched.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The scoring program exited unsuccessfully.
    #[error("scorer exited with {status}: {stderr}")]
    ExitStatus {
        /// Exit status as reported by the OS.
        status: String,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// The scoring program printed something that is not a finite number.
    #[error("scorer output `{output}` is not a finite accuracy")]
    Unparsable {
        /// Trimmed standard output.
        output: String,
    },
}

/// Computes the accuracy of a candidate configuration.
pub trait Scorer: Send + Sync {
    /// Score one candidate.
    fn score(&self, candidate: &Candidate) -> Result<f64, ScoringError>;
}

/// Parse a scorer's standard output as an accuracy.
pub fn parse_accuracy(output: &str) -> Result<f64, ScoringError> {
    let trimmed = output.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ScoringError::Unparsable {
            output: trimmed.to_string(),
        }),
    }
}

/// Scores candidates by running `<program> <args…> <model> "[a b]" "v1_v2"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessScorer {
    program: String,
    args: Vec<String>,
}

impl ProcessScorer {
    /// Create a scorer from a program and its leading arguments.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a whitespace-separated command line such as `python src/ml.py`.
    pub fn from_command_line(command: &str) -> Result<Self, CoreError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| CoreError::Config("scorer command is empty".into()))?;
        Ok(Self::new(program, parts.collect()))
    }

    /// Program that is executed.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument vector for `candidate`.
    #[must_use]
    pub fn arguments(&self, candidate: &Candidate) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(candidate.model.to_string());
        args.push(candidate.param_list());
        args.push(candidate.value_string());
        args
    }
}

impl Scorer for ProcessScorer {
    fn score(&self, candidate: &Candidate) -> Result<f64, ScoringError> {
        let args = self.arguments(candidate);
        debug!(program = %self.program, ?args, "Invoking scorer");
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| ScoringError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(ScoringError::ExitStatus {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        parse_accuracy(&String::from_utf8_lossy(&output.stdout))
    }
}

/// What to do with a candidate whose scoring failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScoringFailurePolicy {
    /// Leave the candidate out of the reduction.
    #[default]
    Exclude,
    /// Count the candidate with accuracy `0.0`.
    Zero,
}

impl ScoringFailurePolicy {
    /// Accuracy to use for a failed candidate, if any.
    #[must_use]
    pub fn fallback(self) -> Option<f64> {
        match self {
            Self::Exclude => None,
            Self::Zero => Some(0.0),
        }
    }
}

impl FromStr for ScoringFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exclude" => Ok(Self::Exclude),
            "zero" => Ok(Self::Zero),
            other => Err(format!(
                "unknown scoring failure policy `{other}` (expected `exclude` or `zero`)"
            )),
        }
    }
}

impl fmt::Display for ScoringFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exclude => f.write_str("exclude"),
            Self::Zero => f.write_str("zero"),
        }
    }
}

/// A candidate together with its accuracy.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// The scored configuration.
    pub candidate: Candidate,
    /// Accuracy reported by the scorer.
    pub accuracy: f64,
}

impl ScoredCandidate {
    /// Whether `self` should replace `other` as the best result.
    ///
    /// Strictly higher accuracy wins; equal accuracy goes to the lower ordinal.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn beats(&self, other: &Self) -> bool {
        self.accuracy > other.accuracy
            || (self.accuracy == other.accuracy
                && self.candidate.ordinal < other.candidate.ordinal)
    }
}

/// Keep whichever of `current` and `challenger` wins.
#[must_use]
pub fn best_of(current: Option<ScoredCandidate>, challenger: ScoredCandidate) -> ScoredCandidate {
    match current {
        Some(current) if !challenger.beats(&current) => current,
        _ => challenger,
    }
}
