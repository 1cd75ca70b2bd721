//! Command-line surface: clap derive tree and dispatch.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;

/// Manage Geneos component instances across hosts
#[derive(Parser)]
#[command(
    name = "geneosctl",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Assume "yes" for every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Installation root on the local host
    #[arg(long, global = true, env = "GENEOSCTL_ROOT", default_value = "/opt/geneos")]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start instance processes
    Start(commands::TargetArgs),

    /// Stop instance processes
    Stop(commands::stop::StopArgs),

    /// Stop then start instance processes
    Restart(commands::restart::RestartArgs),

    /// Ask running instances to reread their configuration
    Reload(commands::TargetArgs),

    /// List running instance processes
    Ps(commands::TargetArgs),

    /// List configured instances
    Ls(commands::TargetArgs),

    /// Point a component's activation link at a package version
    Update(commands::update::UpdateArgs),

    /// Manage the remote host inventory
    #[command(subcommand)]
    Host(commands::host::HostCommand),
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            quiet,
            no_color,
            yes,
            root,
            command,
        } = self;
        let app = AppContext::new(AppFlags {
            no_color,
            quiet,
            yes,
            root,
        })?;
        match command {
            Command::Start(args) => commands::start::run(&app, &args).await,
            Command::Stop(args) => commands::stop::run(&app, &args).await,
            Command::Restart(args) => commands::restart::run(&app, &args).await,
            Command::Reload(args) => commands::reload::run(&app, &args).await,
            Command::Ps(args) => commands::ps::run(&app, &args).await,
            Command::Ls(args) => commands::ls::run(&app, &args).await,
            Command::Update(args) => commands::update::run(&app, &args).await,
            Command::Host(cmd) => commands::host::run(&app, cmd).await,
        }
    }
}
