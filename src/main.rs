//! `evalfill` - unattended course-evaluation filler

mod cli;

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    cli::app::run().await
}
