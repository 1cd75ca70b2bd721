//! Fan-out aggregation semantics.

#![allow(clippy::expect_used)]

use geneosctl_cli::application::InstanceCache;
use geneosctl_cli::application::services::fanout::for_all;
use geneosctl_cli::domain::{Outcome, Registry};

use crate::mocks::{RecordingReporter, StubHost, StubResolver};

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

#[tokio::test]
async fn one_failing_instance_does_not_abort_the_batch() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let local = StubHost::new("localhost");
    local.add_instance(&gateway, "a1");
    local.add_instance(&gateway, "a2");
    let hosts = StubResolver::new(vec![local]);
    let cache = InstanceCache::new();
    let reporter = RecordingReporter::default();

    let mut visited = Vec::new();
    // "a" matches nothing and is skipped with a warning; the two real
    // instances run even though the first one fails.
    for_all(
        &registry,
        &hosts,
        &cache,
        &reporter,
        None,
        &args(&["a", "a1", "a2"]),
        &[],
        false,
        async |instance, _| {
            visited.push(instance.id());
            if instance.name == "a1" {
                anyhow::bail!("copy the setup file first");
            }
            Ok(Outcome::Changed)
        },
    )
    .await
    .expect("batch should aggregate as success");

    assert_eq!(visited, vec!["gateway:a1@localhost", "gateway:a2@localhost"]);
    assert_eq!(reporter.warnings().len(), 1);
    let errors = reporter.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("gateway:a1@localhost:"), "{}", errors[0]);
}

#[tokio::test]
async fn nothing_matching_anywhere_fails_the_batch() {
    let registry = Registry::builtin();
    let hosts = StubResolver::new(vec![StubHost::new("localhost")]);
    let cache = InstanceCache::new();
    let reporter = RecordingReporter::default();

    let err = for_all(
        &registry,
        &hosts,
        &cache,
        &reporter,
        None,
        &args(&["ghost1", "ghost2"]),
        &[],
        false,
        async |_, _| Ok(Outcome::Changed),
    )
    .await
    .expect_err("no matches at all");
    assert!(err.to_string().contains("no matching instances"), "{err}");
    assert_eq!(reporter.warnings().len(), 2);
}

#[tokio::test]
async fn empty_tokens_without_wild_fail() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let local = StubHost::new("localhost");
    local.add_instance(&gateway, "gw1");
    let hosts = StubResolver::new(vec![local]);
    let cache = InstanceCache::new();
    let reporter = RecordingReporter::default();

    let result = for_all(
        &registry,
        &hosts,
        &cache,
        &reporter,
        None,
        &[],
        &[],
        false,
        async |_, _| Ok(Outcome::Changed),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn empty_tokens_with_wild_sweep_the_fleet() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let netprobe = registry.lookup("netprobe").expect("netprobe");
    let local = StubHost::new("localhost");
    local.add_instance(&gateway, "gw1");
    local.add_instance(&netprobe, "probe1");
    let hosts = StubResolver::new(vec![local]);
    let cache = InstanceCache::new();
    let reporter = RecordingReporter::default();

    let mut visited = Vec::new();
    for_all(
        &registry,
        &hosts,
        &cache,
        &reporter,
        None,
        &[],
        &[],
        true,
        async |instance, _| {
            visited.push(instance.id());
            Ok(Outcome::Changed)
        },
    )
    .await
    .expect("sweep");
    assert_eq!(visited, vec!["gateway:gw1@localhost", "netprobe:probe1@localhost"]);
}

#[tokio::test]
async fn a_literal_reserved_word_is_fatal_not_skipped() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let local = StubHost::new("localhost");
    local.add_instance(&gateway, "gw1");
    let hosts = StubResolver::new(vec![local]);
    let cache = InstanceCache::new();
    let reporter = RecordingReporter::default();

    let mut visited = Vec::new();
    let err = for_all(
        &registry,
        &hosts,
        &cache,
        &reporter,
        None,
        &args(&["gw1", "gateway"]),
        &[],
        false,
        async |instance, _| {
            visited.push(instance.id());
            Ok(Outcome::Changed)
        },
    )
    .await
    .expect_err("reserved word must abort");
    assert!(err.to_string().contains("reserved"), "{err}");
    assert!(visited.is_empty(), "nothing may run: {visited:?}");
}

#[tokio::test]
async fn malformed_tokens_become_action_parameters() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let local = StubHost::new("localhost");
    local.add_instance(&gateway, "gw1");
    let hosts = StubResolver::new(vec![local]);
    let cache = InstanceCache::new();
    let reporter = RecordingReporter::default();

    let mut seen = Vec::new();
    for_all(
        &registry,
        &hosts,
        &cache,
        &reporter,
        None,
        &args(&["gw1", "/tmp/setup.xml"]),
        &[],
        false,
        async |_, p| {
            seen = p.to_vec();
            Ok(Outcome::Changed)
        },
    )
    .await
    .expect("run");
    assert_eq!(seen, args(&["/tmp/setup.xml"]));
    assert!(reporter.warnings().is_empty());
}

#[tokio::test]
async fn benign_outcomes_are_logged_not_failed() {
    let registry = Registry::builtin();
    let licd = registry.lookup("licd").expect("licd");
    let local = StubHost::new("localhost");
    local.add_instance(&licd, "lic1");
    let hosts = StubResolver::new(vec![local]);
    let cache = InstanceCache::new();
    let reporter = RecordingReporter::default();

    for_all(
        &registry,
        &hosts,
        &cache,
        &reporter,
        None,
        &args(&["lic1"]),
        &[],
        false,
        async |_, _| Ok(Outcome::Unsupported),
    )
    .await
    .expect("unsupported is benign");
    assert!(reporter.errors().is_empty());
    assert_eq!(reporter.warnings().len(), 1);
}

#[tokio::test]
async fn params_are_passed_through_to_the_action() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let local = StubHost::new("localhost");
    local.add_instance(&gateway, "gw1");
    let hosts = StubResolver::new(vec![local]);
    let cache = InstanceCache::new();
    let reporter = RecordingReporter::default();

    let params = args(&["PORT=7102"]);
    let mut seen = Vec::new();
    for_all(
        &registry,
        &hosts,
        &cache,
        &reporter,
        None,
        &args(&["gw1"]),
        &params,
        false,
        async |_, p| {
            seen = p.to_vec();
            Ok(Outcome::Changed)
        },
    )
    .await
    .expect("run");
    assert_eq!(seen, params);
}
