use anyhow::Result;
use clap::Args;
use evalfill_cli::{AppError, Pipeline};
use std::process::ExitCode;

use super::context::CliContext;

#[derive(Args, Clone, Debug)]
pub struct LoginArgs {}

/// Report the login state; exits non-zero when not logged in
pub async fn cmd_check_login(_args: LoginArgs, ctx: CliContext) -> Result<ExitCode> {
    ctx.config().validate()?;
    let pipeline = Pipeline::new(ctx.config().clone())?;
    let session = ctx.open_session().await?;

    let outcome = async {
        pipeline.open_portal(&session).await?;
        pipeline.check_login(&session, false).await
    }
    .await;
    ctx.finish_session(session).await;

    match outcome {
        Ok(state) => {
            println!("Logged in (page state: {})", state);
            Ok(ExitCode::SUCCESS)
        }
        Err(AppError::NotAuthenticated { state }) => {
            println!("Not logged in (page state: {})", state);
            println!("Log in manually in the browser window, then rerun.");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}
