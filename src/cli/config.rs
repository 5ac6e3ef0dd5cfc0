use anyhow::Result;
use clap::{Args, Subcommand};
use evalfill_cli::AppConfig;
use std::process::ExitCode;

use super::context::CliContext;
use super::output::{to_yaml, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print where the user configuration file is looked up
    Path,
    /// Check the effective configuration
    Validate,
}

pub fn cmd_config(args: ConfigArgs, ctx: CliContext) -> Result<ExitCode> {
    match args.action {
        ConfigAction::Show => {
            let text = match ctx.output() {
                OutputFormat::Json => serde_json::to_string_pretty(ctx.config())?,
                OutputFormat::Human | OutputFormat::Yaml => to_yaml(ctx.config())?,
            };
            println!("{}", text);
        }
        ConfigAction::Path => match AppConfig::default_path() {
            Some(path) => {
                let marker = if path.exists() { "" } else { " (not present)" };
                println!("{}{}", path.display(), marker);
            }
            None => println!("No configuration directory on this platform"),
        },
        ConfigAction::Validate => {
            ctx.config().validate()?;
            println!("Configuration OK");
        }
    }
    Ok(ExitCode::SUCCESS)
}
