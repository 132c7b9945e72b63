mod cli;
mod commands;
mod config;
mod error;
mod logger;

use std::process::ExitCode;

use dotenvy::dotenv;
use virtuoso_triple_store::TripleStoreManager;

use crate::error::AppError;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AppError> {
    let matches = cli::build().get_matches();
    let args = cli::parse(&matches)?;

    let config = config::load_configuration(args.config.as_deref())?;
    logger::initialize(&config.logger, &config.telemetry, args.verbosity);

    let manager = TripleStoreManager::connect(&config.triple_store).await?;

    let mut stdout = std::io::stdout();
    let result = commands::execute(&manager, args.command, &mut stdout).await;

    // Always release the store, even when the command failed
    manager.terminate().await;
    result
}
