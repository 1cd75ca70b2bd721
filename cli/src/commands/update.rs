//! `geneosctl update` — point a component's activation link at a version.

use anyhow::{Context, Result};
use clap::Args;
use regex::Regex;
use std::sync::Arc;

use crate::app::AppContext;
use crate::application::ports::{ALL_HOSTS, HostOps, HostResolver, LOCALHOST};
use crate::application::services::packages::{self, UpdateOutcome};
use crate::domain::{ACTIVE_LINK, Component, HostError};

/// Arguments for the update command.
#[derive(Args)]
pub struct UpdateArgs {
    /// Component type to update; omit to update every component
    #[arg(value_name = "TYPE")]
    pub component: Option<String>,

    /// Version directory name, or `latest`
    // The id must not collide with the --version flag clap propagates
    // into every subcommand.
    #[arg(id = "pkg-version", value_name = "VERSION", default_value = "latest")]
    pub version: String,

    /// Host to update on (`all` for every known host)
    #[arg(long, default_value = LOCALHOST)]
    pub host: String,

    /// Regex restricting which version directories qualify as `latest`
    #[arg(long, value_name = "REGEX")]
    pub filter: Option<String>,

    /// Repoint the link even when it already points at another version
    #[arg(short = 'F', long)]
    pub force: bool,
}

/// Run `geneosctl update`.
///
/// # Errors
///
/// Returns an error when the component type or host is unknown, the
/// filter pattern does not compile, or no version resolves on any
/// selected host.
pub async fn run(app: &AppContext, args: &UpdateArgs) -> Result<()> {
    let components: Vec<Arc<Component>> = match &args.component {
        Some(token) => {
            let component = app.registry.lookup(token).ok_or_else(|| {
                anyhow::anyhow!("unknown component type {token:?}")
            })?;
            vec![component]
        }
        None => app.registry.real_components().cloned().collect(),
    };

    let filter = args
        .filter
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("invalid --filter pattern")?;

    let hosts = if args.host == ALL_HOSTS {
        app.hosts.all_hosts()
    } else {
        let host = app.hosts.get(&args.host);
        if !host.loaded() {
            return Err(HostError::NotFound(args.host.clone()).into());
        }
        vec![host]
    };

    for host in &hosts {
        for component in &components {
            match packages::update(
                host,
                component,
                &args.version,
                filter.as_ref(),
                ACTIVE_LINK,
                args.force,
            )
            .await
            {
                Ok(UpdateOutcome::Updated { version }) => app.output.success(&format!(
                    "{} on {} now active at {version}",
                    component.name,
                    host.name()
                )),
                Ok(UpdateOutcome::Unchanged { version }) => app.output.info(&format!(
                    "{} on {} unchanged at {version}",
                    component.name,
                    host.name()
                )),
                // One missing package must not stop the rest of a sweep.
                Err(e) if args.component.is_none() => {
                    app.output.warn(&format!("{} on {}: {e:#}", component.name, host.name()));
                }
                Err(e) => return Err(e),
            }
        }
    }
    Ok(())
}
