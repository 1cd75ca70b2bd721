//! Start/stop/reload against stubbed hosts and locators.

#![allow(clippy::expect_used)]

use geneosctl_cli::application::services::lifecycle;
use geneosctl_cli::domain::{Outcome, Registry, Signal};
use geneosctl_cli::infra::settings::JsonSettings;

use crate::mocks::{StubHost, StubLocator};

#[tokio::test]
async fn start_spawns_the_launch_command_and_persists_a_port() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let host = StubHost::new("localhost");
    let instance = host.add_instance(&gateway, "gw1");
    let locator = StubLocator::default();

    let outcome = lifecycle::start(&host, &locator, &JsonSettings, &registry, &instance)
        .await
        .expect("start");
    assert_eq!(outcome, Outcome::Changed);
    let spawned = host.spawned();
    assert_eq!(spawned.len(), 1);
    assert!(spawned[0][0].ends_with("gateway2.linux_64"));
    assert_eq!(spawned[0][1], "gw1");
    // First free port of the gateway range, written back before the spawn.
    assert!(spawned[0].contains(&"7039".to_string()));
    assert!(host.file(&instance.settings_file()).is_some());
}

#[tokio::test]
async fn start_allocates_around_ports_other_instances_hold() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let host = StubHost::new("localhost");
    let first = host.add_instance(&gateway, "gw1");
    host.add_file(&first.settings_file(), br#"{"port": 7039}"#);
    let second = host.add_instance(&gateway, "gw2");
    let locator = StubLocator::default();

    lifecycle::start(&host, &locator, &JsonSettings, &registry, &second)
        .await
        .expect("start");
    let spawned = host.spawned();
    assert!(spawned[0].contains(&"7100".to_string()), "{spawned:?}");
}

#[tokio::test]
async fn start_propagates_a_settings_read_failure() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let host = StubHost::new("localhost");
    let instance = host.add_instance(&gateway, "gw1");
    host.add_file(&instance.settings_file(), br#"{"port": 7039}"#);
    host.fail_reads(&instance.settings_file());
    let locator = StubLocator::default();

    // A read failure must not be mistaken for a missing file: starting
    // with defaults here would later clobber the real settings.
    let err = lifecycle::start(&host, &locator, &JsonSettings, &registry, &instance)
        .await
        .expect_err("read failure");
    let chain = format!("{err:#}");
    assert!(chain.contains("loading settings"), "{chain}");
    assert!(chain.contains("connection reset"), "{chain}");
    assert!(host.spawned().is_empty());
}

#[tokio::test]
async fn start_of_a_running_instance_is_a_no_op() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let host = StubHost::new("localhost");
    let instance = host.add_instance(&gateway, "gw1");
    let locator = StubLocator::with_pids(&instance.id(), &[Some(4242)]);

    let outcome = lifecycle::start(&host, &locator, &JsonSettings, &registry, &instance)
        .await
        .expect("start");
    assert_eq!(outcome, Outcome::AlreadyRunning);
    assert!(host.spawned().is_empty());
}

#[tokio::test]
async fn stop_terminates_gracefully_when_the_process_exits() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let host = StubHost::new("localhost");
    let instance = host.add_instance(&gateway, "gw1");
    // Discovered once, gone by the first recheck after SIGTERM.
    let locator = StubLocator::with_pids(&instance.id(), &[Some(4242), None]);

    let outcome = lifecycle::stop(&host, &locator, &instance, false)
        .await
        .expect("stop");
    assert_eq!(outcome, Outcome::Changed);
    assert_eq!(locator.delivered(), vec![(4242, Signal::Term)]);
}

#[tokio::test]
async fn stop_escalates_to_kill_when_term_is_ignored() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let host = StubHost::new("localhost");
    let instance = host.add_instance(&gateway, "gw1");
    // Still discoverable through every grace poll, gone after the kill.
    let locator = StubLocator::with_pids(
        &instance.id(),
        &[Some(4242), Some(4242), Some(4242), Some(4242), Some(4242), None],
    );

    let outcome = lifecycle::stop(&host, &locator, &instance, false)
        .await
        .expect("stop");
    assert_eq!(outcome, Outcome::Changed);
    assert_eq!(
        locator.delivered(),
        vec![(4242, Signal::Term), (4242, Signal::Kill)]
    );
}

#[tokio::test]
async fn stop_of_a_stopped_instance_reports_already_stopped() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let host = StubHost::new("localhost");
    let instance = host.add_instance(&gateway, "gw1");
    let locator = StubLocator::default();

    let outcome = lifecycle::stop(&host, &locator, &instance, false)
        .await
        .expect("stop");
    assert_eq!(outcome, Outcome::AlreadyStopped);
    assert!(locator.delivered().is_empty());
}

#[tokio::test]
async fn forced_stop_skips_the_graceful_phase() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let host = StubHost::new("localhost");
    let instance = host.add_instance(&gateway, "gw1");
    let locator = StubLocator::with_pids(&instance.id(), &[Some(4242), None]);

    let outcome = lifecycle::stop(&host, &locator, &instance, true)
        .await
        .expect("stop");
    assert_eq!(outcome, Outcome::Changed);
    assert_eq!(locator.delivered(), vec![(4242, Signal::Kill)]);
}

#[tokio::test]
async fn stop_fails_when_the_process_survives_sigkill() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let host = StubHost::new("localhost");
    let instance = host.add_instance(&gateway, "gw1");
    let locator = StubLocator::with_pids(&instance.id(), &[Some(4242)]);

    let err = lifecycle::stop(&host, &locator, &instance, true)
        .await
        .expect_err("survivor");
    assert!(err.to_string().contains("still running"), "{err}");
}

#[tokio::test]
async fn reload_signals_a_running_gateway() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let host = StubHost::new("localhost");
    let instance = host.add_instance(&gateway, "gw1");
    let locator = StubLocator::with_pids(&instance.id(), &[Some(4242)]);

    let outcome = lifecycle::reload(&host, &locator, &instance)
        .await
        .expect("reload");
    assert_eq!(outcome, Outcome::Changed);
    assert_eq!(locator.delivered(), vec![(4242, Signal::Usr1)]);
}

#[tokio::test]
async fn reload_is_unsupported_for_licd() {
    let registry = Registry::builtin();
    let licd = registry.lookup("licd").expect("licd");
    let host = StubHost::new("localhost");
    let instance = host.add_instance(&licd, "lic1");
    let locator = StubLocator::with_pids(&instance.id(), &[Some(4242)]);

    let outcome = lifecycle::reload(&host, &locator, &instance)
        .await
        .expect("reload");
    assert_eq!(outcome, Outcome::Unsupported);
    assert!(locator.delivered().is_empty());
}

#[tokio::test]
async fn signal_failures_carry_the_instance_identity() {
    let registry = Registry::builtin();
    let gateway = registry.lookup("gateway").expect("gateway");
    let host = StubHost::new("localhost");
    let instance = host.add_instance(&gateway, "gw1");
    let locator = StubLocator::with_pids(&instance.id(), &[Some(4242)]);
    locator.fail_signals("connection reset");

    let err = lifecycle::reload(&host, &locator, &instance)
        .await
        .expect_err("delivery failure");
    let chain = format!("{err:#}");
    assert!(chain.contains("SIGUSR1"), "{chain}");
    assert!(chain.contains("gateway:gw1@localhost"), "{chain}");
    assert!(chain.contains("connection reset"), "{chain}");
}
