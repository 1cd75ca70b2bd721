//! Wildcard expansion: turning CLI tokens into concrete instance sets.
//!
//! A token can be a full `TYPE:NAME@HOST` address, a bare name that may
//! legitimately match on more than one host, `@HOST` meaning every
//! filtered instance there, or nothing at all (wildcard-aware commands
//! then enumerate the whole fleet). Tokens that cannot be addresses fall
//! through to a residual parameter list instead of failing.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::application::cache::InstanceCache;
use crate::application::ports::{ALL_HOSTS, HostOps, HostResolver};
use crate::domain::{AddressError, Component, Instance, Registry, split_name, valid_instance_name};

/// Result of expanding a command's raw argument list.
#[derive(Debug)]
pub struct Expansion {
    /// Effective component filter after step 2 (`None` = all real types).
    pub filter: Option<Arc<Component>>,
    /// Deduplicated, order-preserving concrete instances.
    pub instances: Vec<Arc<Instance>>,
    /// Tokens that are not instance addresses: `KEY=VALUE` pairs, paths,
    /// and bare names that matched nothing anywhere.
    pub params: Vec<String>,
}

/// Instance names present on `host` for `component`, sorted. A missing
/// instances directory reads as empty, not as an error.
pub async fn instance_names<H: HostOps>(host: &H, component: &Component) -> Vec<String> {
    let dir = host.root().join(component.instances_dir());
    let mut names: Vec<String> = host
        .read_dir(&dir)
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|n| valid_instance_name(n))
        .collect();
    names.sort();
    names
}

/// Expand one address token into its matching instances.
///
/// Zero matches is not an error here: the caller decides whether an empty
/// set is tolerable (fan-out) or turns the token into a parameter
/// (expansion).
pub async fn match_token<R: HostResolver>(
    registry: &Registry,
    hosts: &R,
    cache: &InstanceCache,
    filter: Option<&Arc<Component>>,
    token: &str,
) -> Result<Vec<Arc<Instance>>> {
    let address = split_name(registry, token, ALL_HOSTS);

    let components: Vec<Arc<Component>> = match address.component.as_ref().or(filter) {
        Some(c) => vec![c.clone()],
        None => registry.real_components().cloned().collect(),
    };

    let search: Vec<R::Host> = if address.host == ALL_HOSTS {
        hosts.all_hosts()
    } else {
        let host = hosts.get(&address.host);
        // An unknown or unloadable host contributes no matches; fewer
        // matches is tolerated, not an error.
        if host.loaded() { vec![host] } else { Vec::new() }
    };

    let mut matches = Vec::new();
    for host in &search {
        for component in &components {
            if address.name.is_empty() {
                for name in instance_names(host, component).await {
                    matches.push(cache.intern(component, &name, host.name(), host.root()));
                }
            } else {
                let home = home_for(host.root(), component, &address.name);
                if host.is_dir(&home).await {
                    matches.push(cache.intern(
                        component,
                        &address.name,
                        host.name(),
                        host.root(),
                    ));
                }
            }
        }
    }
    Ok(matches)
}

/// Every instance of the filtered type(s) on every known host.
pub async fn all_instances<R: HostResolver>(
    registry: &Registry,
    hosts: &R,
    cache: &InstanceCache,
    filter: Option<&Arc<Component>>,
) -> Vec<Arc<Instance>> {
    let components: Vec<Arc<Component>> = match filter {
        Some(c) => vec![c.clone()],
        None => registry.real_components().cloned().collect(),
    };
    let mut out = Vec::new();
    for host in hosts.all_hosts() {
        for component in &components {
            for name in instance_names(&host, component).await {
                out.push(cache.intern(component, &name, host.name(), host.root()));
            }
        }
    }
    out
}

/// Split raw arguments into a component filter, address tokens and
/// residual parameters. `KEY=VALUE` pairs never take part in address
/// processing; a leading component alias overrides the command's own
/// filter (the pseudo types resolve to "no filter").
#[must_use]
pub fn partition_args(
    registry: &Registry,
    filter: Option<Arc<Component>>,
    args: &[String],
) -> (Option<Arc<Component>>, Vec<String>, Vec<String>) {
    let mut params = Vec::new();
    let mut tokens = Vec::new();
    for arg in args {
        if arg.contains('=') {
            params.push(arg.clone());
        } else {
            tokens.push(arg.clone());
        }
    }

    let mut filter = filter;
    if let Some(first) = tokens.first()
        && registry.is_alias(first)
    {
        filter = registry.lookup(first);
        tokens.remove(0);
    }
    (filter, tokens, params)
}

/// Expand a raw argument list into filter, instances and parameters.
///
/// `wild` marks the calling command as wildcard-aware: only then does an
/// empty token list enumerate the whole fleet.
///
/// # Errors
///
/// Returns [`AddressError::Reserved`] when a literal, user-typed token
/// names a component alias or operator-reserved word as an instance name.
pub async fn expand<R: HostResolver>(
    registry: &Registry,
    hosts: &R,
    cache: &InstanceCache,
    filter: Option<Arc<Component>>,
    args: &[String],
    wild: bool,
) -> Result<Expansion> {
    let (filter, tokens, mut params) = partition_args(registry, filter, args);

    let mut instances = Vec::new();
    if tokens.is_empty() {
        if wild {
            instances = all_instances(registry, hosts, cache, filter.as_ref()).await;
        }
    } else {
        for token in &tokens {
            let address = split_name(registry, token, ALL_HOSTS);
            if !address.name.is_empty() && !valid_instance_name(&address.name) {
                params.push(token.clone());
                continue;
            }
            // Only literal, user-typed reserved words are fatal; names the
            // expansion itself produces are exempt by construction.
            if registry.is_reserved(&address.name) {
                return Err(AddressError::Reserved(address.name).into());
            }
            let matched = match_token(registry, hosts, cache, filter.as_ref(), token).await?;
            if matched.is_empty() && !address.name.is_empty() && !token.contains('@') {
                // A bare name matching nothing anywhere is preserved for
                // later reinterpretation as a path or URL.
                params.push(token.clone());
            } else {
                instances.extend(matched);
            }
        }
    }

    Ok(Expansion {
        filter,
        instances: dedup(instances),
        params,
    })
}

/// Deduplicate preserving first-seen order.
#[must_use]
pub fn dedup(instances: Vec<Arc<Instance>>) -> Vec<Arc<Instance>> {
    let mut seen = BTreeSet::new();
    instances
        .into_iter()
        .filter(|i| seen.insert(i.id()))
        .collect()
}

/// Home directory an instance of `component` named `name` would occupy on
/// a host rooted at `root`. Shared helper for existence probes.
#[must_use]
pub fn home_for(root: &Path, component: &Component, name: &str) -> std::path::PathBuf {
    root.join(component.instances_dir()).join(name)
}
