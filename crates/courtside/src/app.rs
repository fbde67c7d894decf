//! Application entry point and wiring.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use courtside_cli::{CLIResultPresenter, ProgressDisplay};
use courtside_core::constants::exit_codes;
use courtside_core::{
    load_shots, ChannelObserver, CoreError, JobObserver, LoggingObserver, ObserverSet,
    PngRenderer, ProcessScorer, ShotRecord,
};
use courtside_orchestration::{run as run_jobs, WorkerDispatcher};

use crate::config::AppConfig;

/// Event buffer between the dispatcher and the progress spinner.
const PROGRESS_CHANNEL_CAPACITY: usize = 256;

/// Run the application and return the process exit code.
pub fn run(config: &AppConfig) -> Result<i32> {
    if let Some(shell) = config.completion {
        let mut cmd = <AppConfig as clap::CommandFactory>::command();
        courtside_cli::completion::generate_completion(&mut cmd, shell, &mut std::io::stdout());
        return Ok(exit_codes::SUCCESS);
    }

    let options = config.options();
    std::fs::create_dir_all(&options.output_dir).map_err(|err| {
        CoreError::Config(format!(
            "cannot create output directory {}: {err}",
            options.output_dir.display()
        ))
    })?;

    let shots = load_data(&config.data)?;
    let scorer = ProcessScorer::from_command_line(&config.scorer)?;

    let observers = ObserverSet::new();
    observers.register(Arc::new(LoggingObserver));
    let progress = if config.quiet {
        None
    } else {
        let (tx, rx) = crossbeam_channel::bounded(PROGRESS_CHANNEL_CAPACITY);
        observers.register(Arc::new(ChannelObserver::new(tx)));
        Some(ProgressDisplay::start(rx))
    };
    let observer: Arc<dyn JobObserver> = Arc::new(observers);

    let dispatcher = WorkerDispatcher::new(
        options,
        shots,
        Arc::new(scorer),
        Arc::new(PngRenderer::default()),
    )
    .context("starting worker pool")?
    .with_observer(observer);
    let presenter = CLIResultPresenter::new(config.verbose, config.quiet);

    let summary = run_jobs(std::io::stdin().lock(), &dispatcher, &presenter);

    // The dispatcher owns the last event sender; dropping it lets the spinner exit.
    drop(dispatcher);
    if let Some(progress) = progress {
        progress.finish();
    }

    let summary = summary.context("reading jobs from stdin")?;
    info!(
        processed = summary.processed,
        failed = summary.failed,
        "Run finished"
    );
    Ok(if summary.has_failures() {
        exit_codes::ERROR_JOB_FAILURES
    } else {
        exit_codes::SUCCESS
    })
}

/// Load the shot data set; a missing file yields an empty set.
fn load_data(path: &Path) -> Result<Vec<ShotRecord>, CoreError> {
    match load_shots(path) {
        Ok(shots) => Ok(shots),
        Err(CoreError::DataIo { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Shot data not found, rendering empty charts");
            Ok(Vec::new())
        }
        Err(err) => Err(err),
    }
}
