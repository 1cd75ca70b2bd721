//! Fan-out execution: one action applied across every resolved instance.
//!
//! Per-instance failures are reported and never unwind past this
//! boundary; the batch only fails as a whole when not a single token
//! matched anything. Actions run strictly one at a time, in resolved
//! order.

use std::sync::Arc;

use anyhow::Result;

use crate::application::cache::InstanceCache;
use crate::application::ports::{ALL_HOSTS, HostResolver, Reporter};
use crate::application::services::expand::{all_instances, dedup, match_token};
use crate::domain::{
    AddressError, Component, Instance, Outcome, Registry, split_name, valid_instance_name,
};

/// Apply `action` to every instance the tokens resolve to.
///
/// Tokens go through the same gate as expansion: a literal reserved word
/// is fatal, and a token whose name part cannot be an instance name falls
/// through to the parameter list the action receives. Each remaining
/// token expands independently so that "no matches for this token" stays
/// observable per token: such tokens are logged and skipped. An empty
/// token list enumerates the whole filtered fleet when `wild` is set.
/// `AlreadyStopped`, `AlreadyRunning` and `Unsupported` outcomes
/// aggregate as success; action errors are reported with the instance's
/// full identity and do not abort the loop.
///
/// # Errors
///
/// Returns [`AddressError::Reserved`] for a literal reserved word and
/// [`AddressError::NoMatches`] when no token produced any match at all.
#[allow(clippy::too_many_arguments)]
pub async fn for_all<R, A>(
    registry: &Registry,
    hosts: &R,
    cache: &InstanceCache,
    reporter: &impl Reporter,
    filter: Option<&Arc<Component>>,
    tokens: &[String],
    params: &[String],
    wild: bool,
    mut action: A,
) -> Result<()>
where
    R: HostResolver,
    A: AsyncFnMut(&Instance, &[String]) -> Result<Outcome>,
{
    let mut resolved: Vec<Arc<Instance>> = Vec::new();
    let mut params: Vec<String> = params.to_vec();

    if tokens.is_empty() {
        if wild {
            resolved = all_instances(registry, hosts, cache, filter).await;
        }
        if resolved.is_empty() {
            return Err(AddressError::NoMatches.into());
        }
    } else {
        let mut any = false;
        for token in tokens {
            let address = split_name(registry, token, ALL_HOSTS);
            if !address.name.is_empty() && !valid_instance_name(&address.name) {
                params.push(token.clone());
                continue;
            }
            if registry.is_reserved(&address.name) {
                return Err(AddressError::Reserved(address.name).into());
            }
            let matched = match_token(registry, hosts, cache, filter, token).await?;
            if matched.is_empty() {
                reporter.warn(&format!("no matching instances for {token:?}, skipping"));
            } else {
                any = true;
                resolved.extend(matched);
            }
        }
        if !any {
            return Err(AddressError::NoMatches.into());
        }
        resolved = dedup(resolved);
    }

    for instance in &resolved {
        match action(instance, &params).await {
            Ok(Outcome::Changed) => {}
            Ok(Outcome::AlreadyStopped) => {
                reporter.info(&format!("{instance} already stopped"));
            }
            Ok(Outcome::AlreadyRunning) => {
                reporter.info(&format!("{instance} already running"));
            }
            Ok(Outcome::Unsupported) => {
                reporter.warn(&format!(
                    "{instance}: not supported for {} instances",
                    instance.component.name
                ));
            }
            // Reported here, swallowed for aggregation: fleet commands
            // must not abort because one instance is in a bad state.
            Err(e) => reporter.error(&format!("{instance}: {e:#}")),
        }
    }

    Ok(())
}
