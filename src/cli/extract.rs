use anyhow::Result;
use clap::Args;
use evalfill_cli::Pipeline;
use std::process::ExitCode;

use super::context::CliContext;
use super::output::print_queue;

#[derive(Args, Clone, Debug)]
pub struct ExtractArgs {
    /// Proceed when the login state cannot be determined
    #[arg(long)]
    pub assume_authenticated: bool,
}

pub async fn cmd_extract(args: ExtractArgs, ctx: CliContext) -> Result<ExitCode> {
    ctx.config().validate()?;
    let pipeline = Pipeline::new(ctx.config().clone())?;
    let session = ctx.open_session().await?;

    let outcome = async {
        pipeline.open_portal(&session).await?;
        pipeline
            .check_login(&session, args.assume_authenticated)
            .await?;
        pipeline.list_queue(&session).await
    }
    .await;
    ctx.finish_session(session).await;

    let items = outcome?;
    print_queue(&items, ctx.output())?;
    Ok(ExitCode::SUCCESS)
}
