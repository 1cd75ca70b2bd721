//! `geneosctl ps` — list running instance processes.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::{HostResolver, ProcessLocator, SettingsStore};
use crate::application::services::{expand, lifecycle};
use crate::commands::TargetArgs;

/// Run `geneosctl ps`.
///
/// Only instances with a discoverable process are listed; a fully stopped
/// fleet prints an empty table and succeeds.
///
/// # Errors
///
/// Returns an error when a target token is a reserved name, or when the
/// process table of a host cannot be read.
pub async fn run(app: &AppContext, args: &TargetArgs) -> Result<()> {
    let expansion = expand::expand(
        &app.registry,
        &app.hosts,
        &app.cache,
        None,
        &args.targets,
        true,
    )
    .await?;

    let mut rows: Vec<[String; 6]> = Vec::new();
    for instance in &expansion.instances {
        let host = app.hosts.get(&instance.host);
        let Some(pid) = app.locator.find_pid(&host, instance).await? else {
            continue;
        };
        let settings = app.settings.load(&host, instance).await?;
        rows.push([
            instance.component.name.to_string(),
            instance.name.clone(),
            instance.host.clone(),
            pid.to_string(),
            lifecycle::listen_port(instance, &settings).to_string(),
            instance.home.display().to_string(),
        ]);
    }

    super::print_table(
        app,
        &["TYPE", "NAME", "HOST", "PID", "PORT", "HOME"],
        &rows,
    );
    Ok(())
}
