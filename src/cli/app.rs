use clap::Parser;
use evalfill_cli::AppError;
use std::process::ExitCode;
use tracing::{error, info};

use super::dispatch::dispatch;
use super::env::CliArgs;
use super::runtime::{init_logging, LogOptions};

pub async fn run() -> ExitCode {
    let cli = CliArgs::parse();

    let options = LogOptions {
        level: &cli.log_level,
        debug: cli.debug,
        json: cli.log_json,
        file: cli.log_file.as_deref(),
    };
    let _guard = match init_logging(&options) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("error: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    info!("Starting evalfill v{}", env!("CARGO_PKG_VERSION"));

    match dispatch(&cli).await {
        Ok(code) => code,
        Err(err) => {
            let severity = err.downcast_ref::<AppError>().map(AppError::severity);
            error!(severity = ?severity, "{:#}", err);
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
