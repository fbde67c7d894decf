//! CLI result presenter.

use std::io::{self, Write};

use parking_lot::Mutex;

use courtside_orchestration::{JobOutcome, ResultPresenter, RunSummary};

use crate::output::{format_chart, format_no_result, format_search_report, format_summary};
use crate::ui;

struct Sinks {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
}

/// CLI result presenter.
///
/// Search reports and chart lines go to stdout; failures and the run summary
/// go to stderr. Everything is written under one lock so multi-line search
/// reports from concurrent readers never interleave.
pub struct CLIResultPresenter {
    verbose: bool,
    quiet: bool,
    sinks: Mutex<Sinks>,
}

impl CLIResultPresenter {
    /// Presenter writing to stdout and stderr.
    #[must_use]
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self::with_writers(Box::new(io::stdout()), Box::new(io::stderr()), verbose, quiet)
    }

    /// Presenter writing to the given sinks.
    #[must_use]
    pub fn with_writers(
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
        verbose: bool,
        quiet: bool,
    ) -> Self {
        Self {
            verbose,
            quiet,
            sinks: Mutex::new(Sinks { out, err }),
        }
    }
}

impl ResultPresenter for CLIResultPresenter {
    fn present_outcome(&self, outcome: &JobOutcome) {
        let mut sinks = self.sinks.lock();
        // Write failures (closed pipe) are not worth aborting a batch for.
        let _ = match outcome {
            JobOutcome::Searched {
                job,
                model,
                best: Some(best),
                evaluated,
                failed,
            } => {
                if self.verbose {
                    let _ = writeln!(
                        sinks.err,
                        "job {job}: {evaluated} candidates evaluated, {failed} failed"
                    );
                }
                sinks.out.write_all(format_search_report(model, best).as_bytes())
            }
            JobOutcome::Searched {
                model,
                best: None,
                evaluated,
                failed,
                ..
            } => sinks
                .out
                .write_all(format_no_result(model, *evaluated, *failed).as_bytes()),
            JobOutcome::Rendered {
                path, made, missed, ..
            } if !self.quiet => {
                writeln!(sinks.out, "{}", ui::success(&format_chart(path, *made, *missed)))
            }
            JobOutcome::Rendered { .. } => Ok(()),
            JobOutcome::Failed { job, reason } => {
                writeln!(sinks.err, "{}", ui::error(&format!("job {job}: {reason}")))
            }
        };
        let _ = sinks.out.flush();
    }

    fn present_summary(&self, summary: &RunSummary) {
        if self.quiet {
            return;
        }
        let mut sinks = self.sinks.lock();
        let _ = writeln!(sinks.err, "{}", ui::summary(&format_summary(summary)));
    }
}
