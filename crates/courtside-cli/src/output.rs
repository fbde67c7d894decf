//! CLI output formatting.

use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

use courtside_core::ScoredCandidate;
use courtside_orchestration::RunSummary;

/// Format a duration for display.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 0.001 {
        format!("{:.2}µs", secs * 1_000_000.0)
    } else if secs < 1.0 {
        format!("{:.2}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.3}s")
    } else {
        let mins = (secs / 60.0).floor() as u64;
        let remaining = secs - (mins as f64 * 60.0);
        format!("{mins}m{remaining:.1}s")
    }
}

/// Format a count with thousand separators.
#[must_use]
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Best-model report: the model, one `name : value` line per parameter, the
/// accuracy, and a trailing blank line.
#[must_use]
pub fn format_search_report(model: &str, best: &ScoredCandidate) -> String {
    let mut report = format!("Model: {model}\n");
    for (name, value) in best.candidate.params.iter().zip(&best.candidate.values) {
        let _ = writeln!(report, "{name} : {value}");
    }
    let _ = writeln!(report, "Accuracy: {}", best.accuracy);
    report.push('\n');
    report
}

/// Report for a search in which no candidate produced an accuracy.
#[must_use]
pub fn format_no_result(model: &str, evaluated: usize, failed: usize) -> String {
    format!(
        "Model: {model}\nNo scored candidates ({} evaluated, {} failed)\n\n",
        format_number(evaluated),
        format_number(failed)
    )
}

/// One line describing a written chart.
#[must_use]
pub fn format_chart(path: &Path, made: usize, missed: usize) -> String {
    format!(
        "Chart: {} ({} made, {} missed)",
        path.display(),
        format_number(made),
        format_number(missed)
    )
}

/// End-of-run totals.
#[must_use]
pub fn format_summary(summary: &RunSummary) -> String {
    format!(
        "{} jobs in {}: {} charts, {} searches, {} failed",
        format_number(summary.processed),
        format_duration(summary.elapsed),
        format_number(summary.rendered),
        format_number(summary.searched),
        format_number(summary.failed)
    )
}
