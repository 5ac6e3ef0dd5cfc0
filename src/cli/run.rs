use action_flow::BatchStatus;
use anyhow::Result;
use clap::Args;
use evalfill_cli::Pipeline;
use std::process::ExitCode;
use tracing::info;

use super::context::CliContext;
use super::output::print_report;

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Override the attempt ceiling for this run
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Proceed when the login state cannot be determined
    #[arg(long)]
    pub assume_authenticated: bool,
}

/// Exit status for a finished batch
pub fn exit_code(status: &BatchStatus) -> ExitCode {
    match status {
        BatchStatus::Drained => ExitCode::SUCCESS,
        BatchStatus::AttemptsExhausted => ExitCode::from(2),
        BatchStatus::ExtractionFailed(_) => ExitCode::FAILURE,
    }
}

pub async fn cmd_run(args: RunArgs, mut ctx: CliContext) -> Result<ExitCode> {
    if let Some(max) = args.max_attempts {
        ctx.config_mut().batch.max_attempts = max;
    }
    ctx.config().validate()?;

    let pipeline = Pipeline::new(ctx.config().clone())?;
    let session = ctx.open_session().await?;
    let outcome = pipeline.run(&session, args.assume_authenticated).await;
    ctx.finish_session(session).await;

    let report = outcome?;
    info!(
        run_id = %report.run_id,
        status = %report.status,
        succeeded = report.result.succeeded,
        failed = report.result.failed,
        "Run finished"
    );
    print_report(&report, ctx.output())?;
    Ok(exit_code(&report.status))
}
