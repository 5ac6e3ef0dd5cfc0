use anyhow::Result;
use std::process::ExitCode;

use super::commands::Commands;
use super::config::cmd_config;
use super::context::CliContext;
use super::env::CliArgs;
use super::extract::cmd_extract;
use super::login::cmd_check_login;
use super::run::cmd_run;

pub async fn dispatch(cli: &CliArgs) -> Result<ExitCode> {
    let ctx = CliContext::from_args(cli)?;
    match cli.command.clone() {
        Commands::Run(args) => cmd_run(args, ctx).await,
        Commands::Extract(args) => cmd_extract(args, ctx).await,
        Commands::CheckLogin(args) => cmd_check_login(args, ctx).await,
        Commands::Config(args) => cmd_config(args, ctx),
    }
}
