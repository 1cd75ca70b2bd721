//! `geneosctl stop` — stop instance processes, gracefully by default.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::HostResolver;
use crate::application::services::{expand, fanout, lifecycle};
use crate::domain::Outcome;

/// Arguments for the stop command.
#[derive(Args)]
pub struct StopArgs {
    #[command(flatten)]
    pub targets: super::TargetArgs,

    /// Skip the graceful SIGTERM phase and kill immediately
    #[arg(short = 'K', long)]
    pub force: bool,
}

/// Run `geneosctl stop`.
///
/// # Errors
///
/// Returns an error when no target matches any instance.
pub async fn run(app: &AppContext, args: &StopArgs) -> Result<()> {
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
            let outcome = lifecycle::stop(&host, &app.locator, instance, args.force).await?;
            if outcome == Outcome::Changed {
                app.output.success(&format!("{instance} stopped"));
            }
            Ok(outcome)
        },
    )
    .await
}
