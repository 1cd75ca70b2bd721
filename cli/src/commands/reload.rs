//! `geneosctl reload` — ask running instances to reread their configuration.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::HostResolver;
use crate::application::services::{expand, fanout, lifecycle};
use crate::commands::TargetArgs;
use crate::domain::Outcome;

/// Run `geneosctl reload`.
///
/// # Errors
///
/// Returns an error when no target matches any instance.
pub async fn run(app: &AppContext, args: &TargetArgs) -> Result<()> {
    let (filter, tokens, params) =
        expand::partition_args(&app.registry, None, &args.targets);
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
            let outcome = lifecycle::reload(&host, &app.locator, instance).await?;
            if outcome == Outcome::Changed {
                app.output.success(&format!("{instance} reloaded"));
            }
            Ok(outcome)
        },
    )
    .await
}
