use clap::Subcommand;

use super::config::ConfigArgs;
use super::extract::ExtractArgs;
use super::login::LoginArgs;
use super::run::RunArgs;

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Fill and submit every pending evaluation
    Run(RunArgs),

    /// List the pending evaluations without touching any form
    Extract(ExtractArgs),

    /// Check whether the browser profile is logged in to the portal
    CheckLogin(LoginArgs),

    /// Inspect the effective configuration
    Config(ConfigArgs),
}
