//! `geneosctl host` — manage the remote host inventory.

use anyhow::Result;
use chrono::Utc;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::app::AppContext;
use crate::application::ports::HostResolver;
use crate::application::services::scaffold;
use crate::infra::host::{DEFAULT_ROOT, HostConfig};

#[derive(Subcommand)]
pub enum HostCommand {
    /// Register a remote host reached over SSH
    Add(AddArgs),

    /// Remove a host from the inventory
    Rm(RmArgs),

    /// List configured hosts
    Ls,
}

/// Arguments for `host add`.
#[derive(Args)]
pub struct AddArgs {
    /// Logical name used in instance addresses
    pub name: String,

    /// Hostname or IP to connect to (defaults to the logical name)
    pub hostname: Option<String>,

    /// SSH user name
    #[arg(short, long)]
    pub username: Option<String>,

    /// SSH port
    #[arg(short, long, default_value_t = 22)]
    pub port: u16,

    /// Installation root on the remote host
    #[arg(long, default_value = DEFAULT_ROOT)]
    pub root: PathBuf,
}

/// Arguments for `host rm`.
#[derive(Args)]
pub struct RmArgs {
    /// Host to remove
    pub name: String,
}

/// Run a `geneosctl host` subcommand.
///
/// # Errors
///
/// Returns an error on duplicate or unknown host names, or when the
/// inventory file cannot be written.
pub async fn run(app: &AppContext, cmd: HostCommand) -> Result<()> {
    match cmd {
        HostCommand::Add(args) => {
            let hostname = args.hostname.clone().unwrap_or_else(|| args.name.clone());
            app.hosts.add(HostConfig {
                name: args.name.clone(),
                hostname,
                username: args.username,
                port: args.port,
                root: args.root,
                added_at: Utc::now(),
            })?;
            // An unreachable host is still registered; the layout can
            // be created on a later command once it comes up.
            let host = app.hosts.get(&args.name);
            if let Err(e) = scaffold::ensure_layout(&app.registry, &host).await {
                app.output.warn(&format!("could not scaffold {}: {e:#}", args.name));
            }
            app.output.success(&format!("host {} added", args.name));
        }
        HostCommand::Rm(args) => {
            let prompt = format!(
                "Remove host {}? Instances there stay untouched but become unreachable",
                args.name
            );
            if !app.confirm(&prompt, true)? {
                app.output.info("Aborted.");
                return Ok(());
            }
            app.hosts.remove(&args.name)?;
            app.cache.evict_host(&args.name);
            app.output.success(&format!("host {} removed", args.name));
        }
        HostCommand::Ls => {
            let rows: Vec<[String; 5]> = app
                .hosts
                .list()
                .into_iter()
                .map(|c| {
                    [
                        c.name,
                        c.hostname,
                        c.username.unwrap_or_else(|| "-".to_string()),
                        c.port.to_string(),
                        c.root.display().to_string(),
                    ]
                })
                .collect();
            super::print_table(app, &["NAME", "HOSTNAME", "USER", "PORT", "ROOT"], &rows);
        }
    }
    Ok(())
}
