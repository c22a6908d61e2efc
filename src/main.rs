//! Archive Localizer CLI application
//!
//! Downloads the image attachments of an exported chat archive and embeds
//! them in its pages, resuming from the state file left by earlier runs.

use std::process;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use archive_localizer::cli::{handle_run, Cli};
use archive_localizer::config::AppConfig;

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(_) => {
            println!("{}", Cli::usage());
            process::exit(1);
        }
    };

    // Load configuration before logging so its level applies
    let (config, config_path) = match AppConfig::load().await {
        Ok(loaded) => loaded,
        Err(e) => {
            println!("Error: {}", e);
            process::exit(1);
        }
    };

    init_logging(&config);

    info!("Archive Localizer v{} starting", env!("CARGO_PKG_VERSION"));
    if let Some(path) = config_path {
        info!("Using configuration from {}", path.display());
    }

    // Handle any errors that occurred
    if let Err(e) = handle_run(cli, &config).await {
        error!("Run aborted ({})", e.category());
        println!("Error: {}", e);
        process::exit(1);
    }

    // A "Stop? y/n" prompt may still be blocked on stdin; don't wait for it
    process::exit(0);
}

/// Initialize logging from the configured level
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::new(format!(
        "archive_localizer={}",
        config.logging.level.to_ascii_lowercase()
    ));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_level(false)
        .init();
}
