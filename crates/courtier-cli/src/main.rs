//! Courtier - a command-line back office for the brokerage REST API.
//!
//! Lists, creates, updates and deletes clients, agencies and insurance
//! policies, behind a token-based login.

mod commands;
mod output;

use std::io;

use anyhow::Result;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::Command;

/// Directory for an additional log file (unset: stderr only)
const ENV_LOG_DIR: &str = "COURTIER_LOG_DIR";

/// Log file name inside `COURTIER_LOG_DIR`
const LOG_FILE: &str = "courtier.log";

/// Initialize the tracing subscriber for logging
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var_os(ENV_LOG_DIR) {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Erreur : {}", e);
            eprintln!();
            eprintln!("{}", commands::USAGE);
            std::process::exit(2);
        }
    };

    debug!(?command, "Parsed command");
    if let Err(e) = run(command).await {
        eprintln!("Erreur : {:#}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<()> {
    if matches!(command, Command::Help) {
        println!("{}", commands::USAGE);
        return Ok(());
    }

    let config = courtier_core::Config::load()?;
    info!(api = %config.api_base_url, "Courtier starting");

    commands::execute(command, config).await
}
