//! `geneosctl ls` — list configured instances, running or not.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::{HostResolver, SettingsStore};
use crate::application::services::{expand, lifecycle, packages};
use crate::commands::TargetArgs;

/// Run `geneosctl ls`.
///
/// # Errors
///
/// Returns an error when a target token is a reserved name.
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
        let settings = app.settings.load(&host, instance).await?;
        let version = packages::active_version(&host, &instance.component)
            .await?
            .unwrap_or_else(|| "-".to_string());
        rows.push([
            instance.component.name.to_string(),
            instance.name.clone(),
            instance.host.clone(),
            lifecycle::listen_port(instance, &settings).to_string(),
            version,
            instance.home.display().to_string(),
        ]);
    }

    super::print_table(
        app,
        &["TYPE", "NAME", "HOST", "PORT", "VERSION", "HOME"],
        &rows,
    );
    Ok(())
}
