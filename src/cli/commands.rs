//! Command handler for the archive localizer CLI
//!
//! Connects the loaded configuration, the signal handler and the run
//! controller, then reports how the session went.

use tracing::{debug, info};

use crate::app::{
    AssetFetcher, PageTransformer, RunController, SessionResult, SignalHandler, StopFlag,
};
use crate::cli::Cli;
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Handle a run over the archive named on the command line
///
/// Loads or creates the state file, processes pages until the queue is empty
/// or a stop is requested, and logs the session summary.
pub async fn handle_run(cli: Cli, config: &AppConfig) -> Result<SessionResult> {
    cli.validate().map_err(AppError::generic)?;

    let state_file = config.state_file()?;
    debug!("Using state file {}", state_file.display());

    let fetcher = AssetFetcher::new(&config.client_config(), config.page.include_timestamp)?;
    let transformer = PageTransformer::new(fetcher, config.page_config()?);

    let stop = StopFlag::new();
    let signal_task = SignalHandler::new(stop.clone(), config.run.confirm_stop).setup();

    let result = RunController::initialize(&state_file, cli.archive_root, transformer, stop);
    let result = match result {
        Ok(mut controller) => controller.run().await,
        Err(e) => Err(e),
    };
    signal_task.abort();
    let result = result?;

    let summary = &result.summary;
    info!(
        "{} files processed, {} pages rewritten, {} images embedded, {} failed in {:.1}s",
        summary.pages_processed,
        summary.pages_rewritten,
        summary.images_embedded,
        summary.images_failed,
        result.duration.as_secs_f64()
    );
    if summary.pages_remaining > 0 {
        info!("{} files left for the next run", summary.pages_remaining);
    }
    info!("{}", result.closing_message());

    Ok(result)
}
