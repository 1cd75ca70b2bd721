//! `geneosctl restart` — stop then start, per instance.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::HostResolver;
use crate::application::services::{expand, fanout, lifecycle};
use crate::domain::Outcome;

/// Arguments for the restart command.
#[derive(Args)]
pub struct RestartArgs {
    #[command(flatten)]
    pub targets: super::TargetArgs,

    /// Kill immediately instead of stopping gracefully
    #[arg(short = 'K', long)]
    pub force: bool,
}

/// Run `geneosctl restart`.
///
/// A stopped instance is started anyway: restart means "make it run the
/// active package", not "bounce only what was up".
///
/// # Errors
///
/// Returns an error when no target matches any instance.
pub async fn run(app: &AppContext, args: &RestartArgs) -> Result<()> {
    let (filter, tokens, params) =
        expand::partition_args(&app.registry, None, &args.targets.targets);
    fanout::for_all(
        &app.registry,
        &app.hosts,
        &app.cache,
        &app.output,
        filter.as_ref(),
        &tokens,
        &params,
        true,
        async |instance, _params| {
            let host = app.hosts.get(&instance.host);
            lifecycle::stop(&host, &app.locator, instance, args.force).await?;
            let outcome =
                lifecycle::start(&host, &app.locator, &app.settings, &app.registry, instance)
                    .await?;
            if outcome == Outcome::Changed {
                app.output.success(&format!("{instance} restarted"));
            }
            Ok(outcome)
        },
    )
    .await
}
