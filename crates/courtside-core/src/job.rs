//! Job lines and their decoded form.
//!
//! Each input line is a JSON object whose `command` field selects the job
//! class: a command containing `visualize` is a render job, one containing
//! `ml` is a hyperparameter search. Decoding failures are returned as
//! [`JobError`] so the caller can report them and move on to the next line.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::filter::FieldFilter;
use crate::grid::ParamValue;

/// Error type for a single job that cannot be run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JobError {
    /// The line is not a structurally valid job description.
    #[error("malformed job: {reason}")]
    Malformed {
        /// Offending input.
        line: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The `command` field names neither job class.
    #[error("unknown job command `{0}`")]
    UnknownCommand(String),

    /// A render filter refers to an attribute shot records do not have.
    #[error("unknown filter field `{field}` in spec `{spec}`")]
    UnknownField {
        /// Field name as written.
        field: String,
        /// Full filter spec.
        spec: String,
    },

    /// The parameter grid would exceed the candidate limit.
    #[error("parameter grid has {size} candidates, limit is {limit}")]
    GridTooLarge {
        /// Requested candidate count (saturated on overflow).
        size: usize,
        /// Configured limit.
        limit: usize,
    },
}

impl JobError {
    fn malformed(line: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}

/// A raw input line together with its 1-based position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLine {
    /// Line number, used to identify the job in reports and events.
    pub id: usize,
    /// Raw line text.
    pub text: String,
}

impl JobLine {
    /// Create a job line.
    #[must_use]
    pub fn new(id: usize, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    /// Decode the line into a job.
    pub fn decode(&self) -> Result<Job, JobError> {
        Job::decode(&self.text)
    }
}

/// Job class, derived from the `command` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// Shot chart rendering.
    Render,
    /// Hyperparameter search.
    Search,
}

impl JobKind {
    /// Classify a command string. `visualize` is checked before `ml`.
    #[must_use]
    pub fn classify(command: &str) -> Option<Self> {
        if command.contains("visualize") {
            Some(Self::Render)
        } else if command.contains("ml") {
            Some(Self::Search)
        } else {
            None
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render => f.write_str("render"),
            Self::Search => f.write_str("search"),
        }
    }
}

/// A decoded job.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    /// Render the shots that pass every filter.
    Render(RenderJob),
    /// Score every candidate of a parameter grid and keep the best.
    Search(SearchJob),
}

impl Job {
    /// Decode one JSON job line.
    pub fn decode(line: &str) -> Result<Self, JobError> {
        let head: RawHead =
            serde_json::from_str(line).map_err(|e| JobError::malformed(line, e.to_string()))?;
        match JobKind::classify(&head.command) {
            Some(JobKind::Render) => RenderJob::decode(line).map(Self::Render),
            Some(JobKind::Search) => SearchJob::decode(line).map(Self::Search),
            None => Err(JobError::UnknownCommand(head.command)),
        }
    }

    /// Job class.
    #[must_use]
    pub fn kind(&self) -> JobKind {
        match self {
            Self::Render(_) => JobKind::Render,
            Self::Search(_) => JobKind::Search,
        }
    }
}

#[derive(Deserialize)]
struct RawHead {
    command: String,
}

#[derive(Deserialize)]
struct RawRender {
    #[serde(default)]
    specs: Vec<String>,
}

#[derive(Deserialize)]
struct RawSearch {
    model: String,
    params: Vec<String>,
    param_range: Vec<Vec<Value>>,
}

/// Shot chart request.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    /// Filter specs as written; they also name the output file.
    pub specs: Vec<String>,
    /// Parsed filters, AND-ed together.
    pub filters: Vec<FieldFilter>,
}

impl RenderJob {
    fn decode(line: &str) -> Result<Self, JobError> {
        let raw: RawRender =
            serde_json::from_str(line).map_err(|e| JobError::malformed(line, e.to_string()))?;
        Self::from_specs(raw.specs)
    }

    /// Build a render job from filter specs.
    pub fn from_specs(specs: Vec<String>) -> Result<Self, JobError> {
        let filters = specs
            .iter()
            .map(|spec| FieldFilter::parse(spec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { specs, filters })
    }
}

/// One parameter dimension of a search job.
#[derive(Debug, Clone, PartialEq)]
pub enum Dimension {
    /// Inclusive numeric range, stepped by one.
    Range {
        /// Lower bound.
        min: f64,
        /// Upper bound (inclusive).
        max: f64,
    },
    /// Explicit values, used in the given order.
    List(Vec<ParamValue>),
}

impl Dimension {
    /// Interpret one `param_range` entry.
    ///
    /// A two-element all-numeric array is a range; anything else is a list.
    fn from_values(line: &str, name: &str, values: &[Value]) -> Result<Self, JobError> {
        if values.is_empty() {
            return Err(JobError::malformed(
                line,
                format!("parameter `{name}` has no values"),
            ));
        }
        if let [Value::Number(min), Value::Number(max)] = values {
            if let (Some(min), Some(max)) = (min.as_f64(), max.as_f64()) {
                return Ok(Self::Range { min, max });
            }
        }
        values
            .iter()
            .map(|value| match value {
                Value::Number(n) => Ok(ParamValue::from_number(n)),
                Value::String(s) => Ok(ParamValue::Text(s.clone())),
                Value::Bool(b) => Ok(ParamValue::Text(b.to_string())),
                other => Err(JobError::malformed(
                    line,
                    format!("parameter `{name}` has unsupported value {other}"),
                )),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::List)
    }
}

/// Hyperparameter search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchJob {
    /// Model identifier passed to the scorer.
    pub model: String,
    /// Parameter names, in dimension order.
    pub params: Vec<String>,
    /// One dimension per parameter name.
    pub dimensions: Vec<Dimension>,
}

impl SearchJob {
    fn decode(line: &str) -> Result<Self, JobError> {
        let raw: RawSearch =
            serde_json::from_str(line).map_err(|e| JobError::malformed(line, e.to_string()))?;
        if raw.params.is_empty() {
            return Err(JobError::malformed(line, "search job declares no parameters"));
        }
        if raw.params.len() != raw.param_range.len() {
            return Err(JobError::malformed(
                line,
                format!(
                    "{} parameter names but {} parameter ranges",
                    raw.params.len(),
                    raw.param_range.len()
                ),
            ));
        }
        let dimensions = raw
            .params
            .iter()
            .zip(&raw.param_range)
            .map(|(name, values)| Dimension::from_values(line, name, values))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            model: raw.model,
            params: raw.params,
            dimensions,
        })
    }
}
