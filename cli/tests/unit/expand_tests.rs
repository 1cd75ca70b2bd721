//! Wildcard expansion against stub hosts.

#![allow(clippy::expect_used)]

use geneosctl_cli::application::InstanceCache;
use geneosctl_cli::application::services::expand::{expand, partition_args};
use geneosctl_cli::domain::Registry;

use crate::mocks::{StubHost, StubResolver};

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

fn ids(expansion: &geneosctl_cli::application::services::expand::Expansion) -> Vec<String> {
    expansion.instances.iter().map(|i| i.id()).collect()
}

#[tokio::test]
async fn no_tokens_and_wild_enumerates_every_instance() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let netprobe = registry.lookup("netprobe").expect("netprobe");
    let local = StubHost::new("localhost");
    local.add_instance(&gateway, "gw1");
    local.add_instance(&netprobe, "probe1");
    let remote = StubHost::new("hostB");
    remote.add_instance(&gateway, "gw2");
    let hosts = StubResolver::new(vec![local, remote]);
    let cache = InstanceCache::new();

    let result = expand(&registry, &hosts, &cache, None, &[], true)
        .await
        .expect("expansion");
    assert_eq!(
        ids(&result),
        vec![
            "gateway:gw1@localhost",
            "netprobe:probe1@localhost",
            "gateway:gw2@hostB",
        ]
    );
    assert!(result.params.is_empty());
}

#[tokio::test]
async fn no_tokens_without_wild_matches_nothing() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let local = StubHost::new("localhost");
    local.add_instance(&gateway, "gw1");
    let hosts = StubResolver::new(vec![local]);
    let cache = InstanceCache::new();

    let result = expand(&registry, &hosts, &cache, None, &[], false)
        .await
        .expect("expansion");
    assert!(result.instances.is_empty());
}

#[tokio::test]
async fn bare_name_matches_across_types_and_hosts() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let netprobe = registry.lookup("netprobe").expect("netprobe");
    let local = StubHost::new("localhost");
    local.add_instance(&gateway, "example1");
    let remote = StubHost::new("hostB");
    remote.add_instance(&netprobe, "example1");
    let hosts = StubResolver::new(vec![local, remote]);
    let cache = InstanceCache::new();

    let result = expand(&registry, &hosts, &cache, None, &args(&["example1"]), false)
        .await
        .expect("expansion");
    assert_eq!(
        ids(&result),
        vec!["gateway:example1@localhost", "netprobe:example1@hostB"]
    );
}

#[tokio::test]
async fn at_host_token_enumerates_one_host() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let local = StubHost::new("localhost");
    local.add_instance(&gateway, "gw1");
    let remote = StubHost::new("hostB");
    remote.add_instance(&gateway, "gw2");
    let hosts = StubResolver::new(vec![local, remote]);
    let cache = InstanceCache::new();

    let result = expand(&registry, &hosts, &cache, None, &args(&["@hostB"]), false)
        .await
        .expect("expansion");
    assert_eq!(ids(&result), vec!["gateway:gw2@hostB"]);
}

#[tokio::test]
async fn leading_alias_becomes_the_filter() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let netprobe = registry.lookup("netprobe").expect("netprobe");
    let local = StubHost::new("localhost");
    local.add_instance(&gateway, "gw1");
    local.add_instance(&netprobe, "probe1");
    let hosts = StubResolver::new(vec![local]);
    let cache = InstanceCache::new();

    let result = expand(&registry, &hosts, &cache, None, &args(&["gateways"]), true)
        .await
        .expect("expansion");
    assert_eq!(result.filter.as_ref().map(|c| c.name), Some("gateway"));
    assert_eq!(ids(&result), vec!["gateway:gw1@localhost"]);
}

#[tokio::test]
async fn equals_tokens_and_unmatched_bare_names_become_params() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let local = StubHost::new("localhost");
    local.add_instance(&gateway, "gw1");
    let hosts = StubResolver::new(vec![local]);
    let cache = InstanceCache::new();

    let result = expand(
        &registry,
        &hosts,
        &cache,
        None,
        &args(&["gw1", "PORT=7100", "nosuch"]),
        false,
    )
    .await
    .expect("expansion");
    assert_eq!(ids(&result), vec!["gateway:gw1@localhost"]);
    assert_eq!(result.params, args(&["PORT=7100", "nosuch"]));
}

#[tokio::test]
async fn unmatched_token_with_explicit_host_is_not_a_param() {
    let registry = Registry::builtin();
    let hosts = StubResolver::new(vec![StubHost::new("localhost")]);
    let cache = InstanceCache::new();

    let result = expand(&registry, &hosts, &cache, None, &args(&["gw1@hostB"]), false)
        .await
        .expect("expansion");
    assert!(result.instances.is_empty());
    assert!(result.params.is_empty());
}

#[tokio::test]
async fn literal_reserved_name_is_fatal() {
    let registry = Registry::builtin();
    let hosts = StubResolver::new(vec![StubHost::new("localhost")]);
    let cache = InstanceCache::new();

    // The first token is consumed as an alias, so the reserved word must
    // come later to be read as an instance name.
    let err = expand(&registry, &hosts, &cache, None, &args(&["x1", "gateway"]), false)
        .await
        .expect_err("reserved");
    assert!(err.to_string().contains("reserved"), "{err}");
}

#[tokio::test]
async fn duplicate_tokens_dedup_preserving_order() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let local = StubHost::new("localhost");
    local.add_instance(&gateway, "gw1");
    local.add_instance(&gateway, "gw2");
    let hosts = StubResolver::new(vec![local]);
    let cache = InstanceCache::new();

    let result = expand(
        &registry,
        &hosts,
        &cache,
        None,
        &args(&["gw2", "gw1", "gw2"]),
        false,
    )
    .await
    .expect("expansion");
    assert_eq!(ids(&result), vec!["gateway:gw2@localhost", "gateway:gw1@localhost"]);
}

#[test]
fn partition_consumes_only_the_leading_alias() {
    let registry = Registry::builtin();
    let (filter, tokens, params) = partition_args(
        &registry,
        None,
        &args(&["gateway", "gw1", "LOG=debug"]),
    );
    assert_eq!(filter.map(|c| c.name), Some("gateway"));
    assert_eq!(tokens, args(&["gw1"]));
    assert_eq!(params, args(&["LOG=debug"]));
}
