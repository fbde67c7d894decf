//! Parameter grid expansion.
//!
//! Every dimension of a search job is expanded into an ordered value list and
//! the lists are combined into their cartesian product, dimension 0 varying
//! slowest. The product is built iteratively so any number of dimensions is
//! supported.

use std::fmt;
use std::sync::Arc;

use crate::constants::MAX_GRID_CANDIDATES;
use crate::job::{Dimension, JobError, SearchJob};

/// One concrete hyperparameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Integral value.
    Int(i64),
    /// Non-integral numeric value.
    Float(f64),
    /// Categorical value.
    Text(String),
}

impl ParamValue {
    /// Convert a JSON number, keeping integers integral.
    #[must_use]
    pub fn from_number(n: &serde_json::Number) -> Self {
        match n.as_i64() {
            Some(i) => Self::Int(i),
            None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One point of a parameter grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Position in nested-loop order.
    pub ordinal: usize,
    /// Model identifier, shared by every candidate of the job.
    pub model: Arc<str>,
    /// Parameter names, shared by every candidate of the job.
    pub params: Arc<[String]>,
    /// One value per parameter.
    pub values: Vec<ParamValue>,
}

impl Candidate {
    /// Values joined with `_`, e.g. `3_uniform`.
    #[must_use]
    pub fn value_string(&self) -> String {
        self.values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Names rendered as `[a b c]`.
    #[must_use]
    pub fn param_list(&self) -> String {
        format!("[{}]", self.params.join(" "))
    }
}

/// Expand one dimension into its ordered values.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]
pub fn expand_dimension(dimension: &Dimension) -> Vec<ParamValue> {
    match dimension {
        Dimension::List(values) => values.clone(),
        Dimension::Range { min, max } if min > max => Vec::new(),
        Dimension::Range { min, max } if min.fract() == 0.0 && max.fract() == 0.0 => {
            ((*min as i64)..=(*max as i64)).map(ParamValue::Int).collect()
        }
        Dimension::Range { min, max } => {
            let steps = (max - min).floor() as usize;
            (0..=steps)
                .map(|k| ParamValue::Float(min + k as f64))
                .collect()
        }
    }
}

/// Number of values `dimension` expands to, computed without expanding it.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn dimension_len(dimension: &Dimension) -> usize {
    match dimension {
        Dimension::List(values) => values.len(),
        Dimension::Range { min, max } if min > max => 0,
        Dimension::Range { min, max } => ((max - min).floor() as usize).saturating_add(1),
    }
}

/// Number of candidates `dimensions` would produce, saturating.
fn grid_size(dimensions: &[Dimension]) -> usize {
    if dimensions.is_empty() {
        return 0;
    }
    dimensions
        .iter()
        .fold(1usize, |acc, d| acc.saturating_mul(dimension_len(d)))
}

/// Cartesian product of `lists` in nested-loop order.
///
/// Zero lists yield no combinations; any empty list yields none either.
#[must_use]
pub fn cartesian(lists: &[Vec<ParamValue>]) -> Vec<Vec<ParamValue>> {
    if lists.is_empty() || lists.iter().any(Vec::is_empty) {
        return Vec::new();
    }
    let mut combos: Vec<Vec<ParamValue>> = vec![Vec::with_capacity(lists.len())];
    for list in lists {
        let mut next = Vec::with_capacity(combos.len() * list.len());
        for prefix in &combos {
            for value in list {
                let mut combo = prefix.clone();
                combo.push(value.clone());
                next.push(combo);
            }
        }
        combos = next;
    }
    combos
}

/// Expand a search job into its ordered candidates.
pub fn expand_grid(job: &SearchJob) -> Result<Vec<Candidate>, JobError> {
    expand_grid_with_limit(job, MAX_GRID_CANDIDATES)
}

/// As [`expand_grid`], with an explicit candidate limit.
pub fn expand_grid_with_limit(job: &SearchJob, limit: usize) -> Result<Vec<Candidate>, JobError> {
    let size = grid_size(&job.dimensions);
    if size > limit {
        return Err(JobError::GridTooLarge { size, limit });
    }
    let lists: Vec<Vec<ParamValue>> = job.dimensions.iter().map(expand_dimension).collect();
    let model: Arc<str> = Arc::from(job.model.as_str());
    let params: Arc<[String]> = Arc::from(job.params.clone());
    Ok(cartesian(&lists)
        .into_iter()
        .enumerate()
        .map(|(ordinal, values)| Candidate {
            ordinal,
            model: Arc::clone(&model),
            params: Arc::clone(&params),
            values,
        })
        .collect())
}
