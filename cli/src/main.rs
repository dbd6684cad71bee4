//! Fuel Station Sales Register - command line tool
//!
//! Records shift sales per pump, reconciles meter readings against
//! collected payments, and exports the history as CSV.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod storage;

use commands::{announce, App, Cli};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Environment: {}", config.environment);

    let mut app = App::new(&config, cli.data_dir);
    match app.run(cli.command) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            tracing::debug!(error = ?err, "Command failed");
            announce(&err.notification());
            Ok(ExitCode::FAILURE)
        }
    }
}
