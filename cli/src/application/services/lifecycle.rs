//! Process lifecycle: discover, start, stop and signal instance processes.
//!
//! There is no supervisor and no PID file; discovery goes through the
//! [`ProcessLocator`] port, so the state machine per instance is simply
//! absent → starting → running → stopping → absent, with no crashed state
//! tracked (the next discovery just reports absent).

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{HostOps, ProcessLocator, Settings, SettingsStore};
use crate::application::services::expand::instance_names;
use crate::domain::{
    ACTIVE_LINK, ComponentKind, Instance, Outcome, PortRange, Registry, Signal, SignalResult,
};

/// Rediscovery attempts after SIGTERM before escalating to SIGKILL.
const GRACE_POLLS: u32 = 4;
/// Pause between rediscovery attempts.
const GRACE_INTERVAL: Duration = Duration::from_millis(250);

/// Resolved log file for an instance: the `logfile` setting relative to
/// the home, or the component default.
#[must_use]
pub fn log_file(instance: &Instance, settings: &Settings) -> PathBuf {
    settings
        .get_str("logfile")
        .map_or_else(|| instance.default_log_file(), |f| instance.home.join(f))
}

/// Listening port for an instance: the persisted setting, or the first
/// port of the component's range when none was ever assigned.
#[must_use]
pub fn listen_port(instance: &Instance, settings: &Settings) -> u16 {
    settings.get_port("port").unwrap_or_else(|| {
        PortRange::parse(instance.component.port_range)
            .map(|r| r.next_port(&BTreeSet::new()))
            .unwrap_or(0)
    })
}

/// Build the launch argv and environment for an instance.
///
/// The executable resolves through the component's package tree and the
/// `active_prod` activation link; which version that link points at is
/// the version resolver's business, not ours.
#[must_use]
pub fn launch_command(
    instance: &Instance,
    settings: &Settings,
    root: &std::path::Path,
) -> (Vec<String>, Vec<(String, String)>) {
    let packages = root.join(instance.component.packages_dir()).join(ACTIVE_LINK);
    let port = listen_port(instance, settings).to_string();
    let log = log_file(instance, settings);

    match instance.component.kind {
        ComponentKind::Gateway => {
            let binary = settings.get_str("binary").unwrap_or("gateway2.linux_64");
            let mut argv = vec![
                packages.join(binary).to_string_lossy().into_owned(),
                instance.name.clone(),
                "-port".into(),
                port,
                "-log".into(),
                log.to_string_lossy().into_owned(),
            ];
            if let Some(setup) = settings.get_str("setup") {
                argv.push("-setup".into());
                argv.push(instance.home.join(setup).to_string_lossy().into_owned());
            }
            (argv, Vec::new())
        }
        ComponentKind::Netprobe | ComponentKind::San => {
            let binary = settings.get_str("binary").unwrap_or("netprobe.linux_64");
            let argv = vec![
                packages.join(binary).to_string_lossy().into_owned(),
                "-port".into(),
                port,
            ];
            let env = vec![(
                "LOG_FILENAME".to_string(),
                log.to_string_lossy().into_owned(),
            )];
            (argv, env)
        }
        ComponentKind::Licd => {
            let binary = settings.get_str("binary").unwrap_or("licd.linux_64");
            let argv = vec![
                packages.join(binary).to_string_lossy().into_owned(),
                "-port".into(),
                port,
                "-log".into(),
                log.to_string_lossy().into_owned(),
            ];
            (argv, Vec::new())
        }
        ComponentKind::Webserver => {
            let maxmem = settings.get_str("maxmem").unwrap_or("1024m");
            let jar = packages.join("geneos-web-server.jar");
            let argv = vec![
                "java".into(),
                format!("-Dworking.directory={}", instance.home.display()),
                format!("-Xmx{maxmem}"),
                "-jar".into(),
                jar.to_string_lossy().into_owned(),
                "-port".into(),
                port,
            ];
            (argv, Vec::new())
        }
        // Pseudo types never reach the lifecycle engine.
        ComponentKind::None | ComponentKind::All => (Vec::new(), Vec::new()),
    }
}

/// Ports claimed by persisted settings on `host`, across every real
/// component. The allocator never reuses them, even across types whose
/// ranges overlap.
///
/// # Errors
///
/// Returns an error when a settings file exists but cannot be read.
pub async fn used_ports<H, S>(host: &H, registry: &Registry, store: &S) -> Result<BTreeSet<u16>>
where
    H: HostOps,
    S: SettingsStore,
{
    let mut used = BTreeSet::new();
    for component in registry.real_components() {
        for name in instance_names(host, component).await {
            let instance = Instance::new(component.clone(), &name, host.name(), host.root());
            let settings = store.load(host, &instance).await?;
            if let Some(port) = settings.get_port("port") {
                used.insert(port);
            }
        }
    }
    Ok(used)
}

/// Start an instance's process, detached, logging to its log file.
///
/// An instance that never had a port assigned gets the first free port of
/// its component's range, persisted before the spawn so the assignment
/// survives restarts.
///
/// # Errors
///
/// Returns an error if settings cannot be loaded, the component's port
/// range is exhausted, or the spawn fails.
pub async fn start<H, L, S>(
    host: &H,
    locator: &L,
    store: &S,
    registry: &Registry,
    instance: &Instance,
) -> Result<Outcome>
where
    H: HostOps,
    L: ProcessLocator,
    S: SettingsStore,
{
    if locator.find_pid(host, instance).await?.is_some() {
        return Ok(Outcome::AlreadyRunning);
    }

    let mut settings = store
        .load(host, instance)
        .await
        .with_context(|| format!("loading settings for {instance}"))?;
    if settings.get_port("port").is_none() {
        let range = PortRange::parse(instance.component.port_range)?;
        let used = used_ports(host, registry, store).await?;
        let port = range.next_port(&used);
        anyhow::ensure!(
            port != 0,
            "port range {:?} exhausted on {}",
            instance.component.port_range,
            host.name()
        );
        settings.set("port", port);
        store
            .save(host, instance, &settings)
            .await
            .with_context(|| format!("persisting port {port} for {instance}"))?;
    }
    let (argv, env) = launch_command(instance, &settings, host.root());
    anyhow::ensure!(!argv.is_empty(), "{instance} has no launch command");

    let log = log_file(instance, &settings);
    host.spawn_detached(&argv, &env, &instance.home, &log)
        .await
        .with_context(|| format!("starting {instance}"))?;
    Ok(Outcome::Changed)
}

/// Stop an instance's process: SIGTERM, grace-poll, then SIGKILL.
///
/// `force` skips straight to SIGKILL. An undiscoverable process reports
/// `AlreadyStopped` so that restart-if-running idioms work uniformly.
///
/// # Errors
///
/// Returns an error if signal delivery fails, or if the process is still
/// discoverable after SIGKILL.
pub async fn stop<H, L>(host: &H, locator: &L, instance: &Instance, force: bool) -> Result<Outcome>
where
    H: HostOps,
    L: ProcessLocator,
{
    let Some(pid) = locator.find_pid(host, instance).await? else {
        return Ok(Outcome::AlreadyStopped);
    };

    if !force {
        match deliver(host, locator, instance, pid, Signal::Term).await? {
            SignalResult::NoSuchProcess => return Ok(Outcome::AlreadyStopped),
            SignalResult::Delivered => {}
        }
        for _ in 0..GRACE_POLLS {
            tokio::time::sleep(GRACE_INTERVAL).await;
            if locator.find_pid(host, instance).await?.is_none() {
                return Ok(Outcome::Changed);
            }
        }
    }

    match deliver(host, locator, instance, pid, Signal::Kill).await? {
        SignalResult::NoSuchProcess => return Ok(Outcome::Changed),
        SignalResult::Delivered => {}
    }
    tokio::time::sleep(GRACE_INTERVAL).await;
    match locator.find_pid(host, instance).await? {
        None => Ok(Outcome::Changed),
        Some(pid) => anyhow::bail!("{instance} still running as pid {pid} after SIGKILL"),
    }
}

/// Ask an instance to reread its configuration.
///
/// Components without a reload signal report `Unsupported`, which the
/// fan-out executor treats as a non-fatal no-op.
///
/// # Errors
///
/// Returns an error if signal delivery fails.
pub async fn reload<H, L>(host: &H, locator: &L, instance: &Instance) -> Result<Outcome>
where
    H: HostOps,
    L: ProcessLocator,
{
    let Some(signal) = instance.component.reload_signal else {
        return Ok(Outcome::Unsupported);
    };
    let Some(pid) = locator.find_pid(host, instance).await? else {
        return Ok(Outcome::AlreadyStopped);
    };
    match deliver(host, locator, instance, pid, signal).await? {
        SignalResult::NoSuchProcess => Ok(Outcome::AlreadyStopped),
        SignalResult::Delivered => Ok(Outcome::Changed),
    }
}

async fn deliver<H, L>(
    host: &H,
    locator: &L,
    instance: &Instance,
    pid: u32,
    signal: Signal,
) -> Result<SignalResult>
where
    H: HostOps,
    L: ProcessLocator,
{
    locator.signal(host, pid, signal).await.with_context(|| {
        format!(
            "delivering {signal} (signal {}) to {instance} (pid {pid})",
            signal.number()
        )
    })
}
