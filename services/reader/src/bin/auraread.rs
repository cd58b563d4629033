//! services/reader/src/bin/auraread.rs

use std::process::ExitCode;

use clap::Parser;
use reader_lib::{
    app::{AppState, AppStore},
    cli::{self, Cli},
    config::Config,
    error::ReaderError,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn run(args: Cli) -> Result<(), ReaderError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let mut config = Config::from_env()?;
    if let Some(url) = &args.api_url {
        config = config.with_api_url(url)?;
    }
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Using API at {}", config.api_url);

    // --- 2. Initialize Adapters & Restore the Session ---
    let state = AppState::from_config(config)?;
    let mut store = AppStore::new(state);

    // --- 3. Run the Command ---
    cli::run(args.command, &mut store).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    let starts_session = args.command.starts_session();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_unauthorized() && !starts_session => {
            error!("Authentication failed: {}", e);
            eprintln!("{}\nPlease log in again with `auraread login <username>`.", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
