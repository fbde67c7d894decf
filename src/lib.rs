//! Shared fixtures for the cross-crate integration tests in `tests/`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use courtside_core::{Candidate, RenderError, Renderer, Scorer, ScoringError, ShotChart, ShotRecord};

/// Scorer answering from a table keyed by [`Candidate::value_string`].
///
/// Unknown keys fail with [`ScoringError::Unparsable`].
#[derive(Debug, Default)]
pub struct TableScorer {
    table: HashMap<String, f64>,
    calls: Mutex<Vec<String>>,
}

impl TableScorer {
    /// Scorer with the given `(value_string, accuracy)` pairs.
    pub fn new(entries: &[(&str, f64)]) -> Self {
        Self {
            table: entries.iter().map(|(k, v)| ((*k).to_string(), *v)).collect(),
            calls: Mutex::default(),
        }
    }

    /// Value strings scored so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl Scorer for TableScorer {
    fn score(&self, candidate: &Candidate) -> Result<f64, ScoringError> {
        let key = candidate.value_string();
        self.calls.lock().push(key.clone());
        self.table
            .get(&key)
            .copied()
            .ok_or(ScoringError::Unparsable { output: key })
    }
}

/// Renderer that keeps charts in memory.
#[derive(Debug, Default)]
pub struct MemoryRenderer {
    charts: Mutex<Vec<(PathBuf, ShotChart)>>,
}

impl MemoryRenderer {
    /// Charts rendered so far, sorted by path.
    pub fn charts(&self) -> Vec<(PathBuf, ShotChart)> {
        let mut charts = self.charts.lock().clone();
        charts.sort_by(|a, b| a.0.cmp(&b.0));
        charts
    }
}

impl Renderer for MemoryRenderer {
    fn render(&self, chart: &ShotChart, path: &Path) -> Result<(), RenderError> {
        self.charts.lock().push((path.to_path_buf(), chart.clone()));
        Ok(())
    }
}

/// `n` shots cycling through periods 1..=4 and opponents POR/UTA/SAS;
/// shots alternate made/missed in blocks of four.
pub fn sample_shots(n: usize) -> Vec<ShotRecord> {
    const OPPONENTS: [&str; 3] = ["POR", "UTA", "SAS"];
    (0..n)
        .map(|i| ShotRecord {
            period: (i % 4 + 1) as i64,
            opponent: OPPONENTS[i % 3].to_string(),
            shot_made_flag: i64::from((i / 4) % 2 == 0),
            loc_x: i as f64,
            loc_y: (i * 3) as f64,
            shot_id: i as i64,
            ..ShotRecord::default()
        })
        .collect()
}
