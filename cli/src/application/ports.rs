//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::{Instance, Signal, SignalResult};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Logical name of the machine running the tool.
pub const LOCALHOST: &str = "localhost";

/// Sentinel host name meaning "every known host". Never a real execution
/// target: the expander resolves it before any capability call is made.
pub const ALL_HOSTS: &str = "all";

// ── Host capability port ──────────────────────────────────────────────────────

/// Capability surface of one execution target (local machine or an
/// SSH-reached remote). Values are cheap handles: cloning shares the
/// underlying connection configuration.
#[allow(async_fn_in_trait)]
pub trait HostOps: Clone {
    /// Logical host name (`localhost` or a remote alias).
    fn name(&self) -> &str;
    /// Whether operations run on the machine hosting the tool.
    fn is_local(&self) -> bool;
    /// Whether persisted settings for this host were found and read.
    /// Hosts that fail to load still exist but never produce matches.
    fn loaded(&self) -> bool;
    /// Installation root on this host (e.g. `/opt/geneos`).
    fn root(&self) -> &Path;

    /// True when `path` exists and is a directory. Errors read as `false`.
    async fn is_dir(&self, path: &Path) -> bool;
    /// Names of the entries directly under `path`.
    async fn read_dir(&self, path: &Path) -> Result<Vec<String>>;
    /// Contents of the file at `path`, or `None` when it does not exist.
    /// Read failures are errors, never `None`: callers must be able to
    /// tell "no file yet" from a transient IO or transport failure.
    async fn read_file(&self, path: &Path) -> Result<Option<Vec<u8>>>;
    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<()>;
    async fn mkdir_all(&self, path: &Path) -> Result<()>;
    async fn remove_file(&self, path: &Path) -> Result<()>;
    async fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    /// Create a symlink at `link` pointing to `target`.
    async fn symlink(&self, target: &Path, link: &Path) -> Result<()>;
    /// Target of the symlink at `path`, or `None` when `path` is absent
    /// or not a symlink.
    async fn read_link(&self, path: &Path) -> Result<Option<PathBuf>>;

    /// Run a shell command on this host and capture its output. Used for
    /// remote signal delivery and the remote process-table listing.
    async fn run(&self, command: &str) -> Result<Output>;
    /// Spawn a process detached from the tool, working directory `cwd`,
    /// stdout and stderr appended to `log`. Returns without waiting — the
    /// tool is not a supervisor.
    async fn spawn_detached(
        &self,
        argv: &[String],
        env: &[(String, String)],
        cwd: &Path,
        log: &Path,
    ) -> Result<()>;
}

/// Resolves logical host names to capability handles.
///
/// Repeated lookups of one name return the same host; `get` never fails
/// structurally — a name with no persisted configuration yields a host
/// whose `loaded()` is `false`.
pub trait HostResolver {
    type Host: HostOps;
    fn get(&self, name: &str) -> Self::Host;
    /// LOCAL plus every host with persisted configuration. Under elevated
    /// privileges only LOCAL, so root runs never fan out to hosts
    /// configured by an unprivileged user.
    fn all_hosts(&self) -> Vec<Self::Host>;
}

// ── Process location port ─────────────────────────────────────────────────────

/// Strategy for finding and signalling instance processes.
///
/// The default implementation scans a Unix `/proc`-style process table;
/// a PID-file or service-manager strategy can be substituted without
/// touching the lifecycle or fan-out logic.
#[allow(async_fn_in_trait)]
pub trait ProcessLocator {
    /// PID of the process backing `instance`, or `None` when no candidate
    /// matches ("process already stopped", never a hard error).
    async fn find_pid<H: HostOps>(&self, host: &H, instance: &Instance) -> Result<Option<u32>>;
    /// Deliver `signal` to `pid` on `host`. ESRCH-like failures normalise
    /// to [`SignalResult::NoSuchProcess`].
    async fn signal<H: HostOps>(&self, host: &H, pid: u32, signal: Signal)
    -> Result<SignalResult>;
}

// ── Command runner port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output, under the runner's default
    /// timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout. On timeout the child must be
    /// killed, not left orphaned.
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program with stdin piped from `input`.
    async fn run_with_stdin(&self, program: &str, args: &[&str], input: &[u8]) -> Result<Output>;
}

// ── Settings port ─────────────────────────────────────────────────────────────

/// Typed per-instance settings, persisted as one JSON object in the
/// instance home.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings(BTreeMap<String, serde_json::Value>);

impl Settings {
    /// Seed settings from the component's default templates, with `{name}`
    /// and `{home}` placeholders expanded.
    #[must_use]
    pub fn defaults_for(instance: &Instance) -> Self {
        let home = instance.home.to_string_lossy();
        let map = instance
            .component
            .defaults
            .iter()
            .map(|(k, v)| {
                let expanded = v.replace("{name}", &instance.name).replace("{home}", &home);
                ((*k).to_string(), serde_json::Value::String(expanded))
            })
            .collect();
        Self(map)
    }

    #[must_use]
    pub fn from_map(map: BTreeMap<String, serde_json::Value>) -> Self {
        Self(map)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(serde_json::Value::as_str)
    }

    /// Numeric setting; accepts both JSON numbers and numeric strings,
    /// since hand-edited files routinely quote ports.
    #[must_use]
    pub fn get_port(&self, key: &str) -> Option<u16> {
        match self.0.get(key)? {
            serde_json::Value::Number(n) => n.as_u64().and_then(|v| u16::try_from(v).ok()),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, serde_json::Value> {
        self.0
    }
}

/// Per-instance settings persistence: the core only needs get/set/save.
#[allow(async_fn_in_trait)]
pub trait SettingsStore {
    /// Load settings for `instance`, falling back to component defaults
    /// when no file exists yet.
    async fn load<H: HostOps>(&self, host: &H, instance: &Instance) -> Result<Settings>;
    async fn save<H: HostOps>(
        &self,
        host: &H,
        instance: &Instance,
        settings: &Settings,
    ) -> Result<()>;
}

// ── Progress reporting port ───────────────────────────────────────────────────

/// Abstracts terminal reporting so services can log per-instance outcomes
/// without depending on the Presentation layer. Sync trait — no async
/// needed.
pub trait Reporter {
    /// Emit an in-progress or informational message.
    fn info(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning (skipped token, unsupported action).
    fn warn(&self, message: &str);
    /// Emit a per-instance failure. Never aborts the batch.
    fn error(&self, message: &str);
}
