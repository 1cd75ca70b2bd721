//! Host capability implementations and the persisted host inventory.
//!
//! Two shapes of host exist: the local machine (std::fs and `sh -c`) and
//! SSH-reached remotes (every operation is an `ssh` invocation through
//! the command runner). Both hide behind the same [`HostOps`] surface, so
//! the services cannot tell them apart.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::ports::{ALL_HOSTS, CommandRunner, HostOps, HostResolver, LOCALHOST};
use crate::domain::HostError;
use crate::infra::command_runner::TokioCommandRunner;

/// Default installation root on every host.
pub const DEFAULT_ROOT: &str = "/opt/geneos";

// ── Host configuration ────────────────────────────────────────────────────────

/// Persisted configuration for one remote host (`~/.geneosctl/hosts.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Logical alias used in instance addresses.
    pub name: String,
    /// Hostname or IP the SSH session connects to.
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default = "default_ssh_port")]
    pub port: u16,
    #[serde(default = "default_root")]
    pub root: PathBuf,
    pub added_at: DateTime<Utc>,
}

fn default_ssh_port() -> u16 {
    22
}

fn default_root() -> PathBuf {
    PathBuf::from(DEFAULT_ROOT)
}

// ── Host ──────────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum HostKind {
    Local,
    Remote(HostConfig),
    /// Referenced by name but absent from the inventory. Refuses every
    /// operation, so it can never be executed against by accident.
    Unknown,
}

#[derive(Debug)]
struct HostInner {
    name: String,
    root: PathBuf,
    kind: HostKind,
    runner: TokioCommandRunner,
}

/// Cheap handle to one execution target; clones share the configuration.
#[derive(Debug, Clone)]
pub struct Host(Arc<HostInner>);

impl Host {
    fn local(root: PathBuf) -> Self {
        Self(Arc::new(HostInner {
            name: LOCALHOST.to_string(),
            root,
            kind: HostKind::Local,
            runner: TokioCommandRunner::default(),
        }))
    }

    fn remote(config: HostConfig) -> Self {
        Self(Arc::new(HostInner {
            name: config.name.clone(),
            root: config.root.clone(),
            kind: HostKind::Remote(config),
            runner: TokioCommandRunner::default(),
        }))
    }

    /// A host referenced by name but absent from the inventory. Repeated
    /// lookups return the same value; it never loads, never produces
    /// matches, and refuses every capability call.
    fn unknown(name: &str) -> Self {
        Self(Arc::new(HostInner {
            name: name.to_string(),
            root: PathBuf::from(DEFAULT_ROOT),
            kind: HostKind::Unknown,
            runner: TokioCommandRunner::default(),
        }))
    }

    fn not_configured(&self) -> anyhow::Error {
        HostError::NotFound(self.0.name.clone()).into()
    }

    fn ssh_args(config: &HostConfig) -> Vec<String> {
        let target = match &config.username {
            Some(user) => format!("{user}@{}", config.hostname),
            None => config.hostname.clone(),
        };
        vec![
            "-o".into(),
            "BatchMode=yes".into(),
            "-p".into(),
            config.port.to_string(),
            target,
            "--".into(),
        ]
    }

    async fn ssh(&self, config: &HostConfig, command: &str) -> Result<Output> {
        let mut args = Self::ssh_args(config);
        args.push(command.to_string());
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.0
            .runner
            .run("ssh", &args)
            .await
            .with_context(|| format!("running on {}: {command}", self.0.name))
    }

    async fn ssh_with_stdin(
        &self,
        config: &HostConfig,
        command: &str,
        input: &[u8],
    ) -> Result<Output> {
        let mut args = Self::ssh_args(config);
        args.push(command.to_string());
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.0
            .runner
            .run_with_stdin("ssh", &args, input)
            .await
            .with_context(|| format!("running on {}: {command}", self.0.name))
    }
}

/// Single-quote `s` for a POSIX shell command line.
#[must_use]
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

fn quoted(path: &Path) -> String {
    shell_quote(&path.to_string_lossy())
}

impl HostOps for Host {
    fn name(&self) -> &str {
        &self.0.name
    }

    fn is_local(&self) -> bool {
        matches!(self.0.kind, HostKind::Local)
    }

    fn loaded(&self) -> bool {
        !matches!(self.0.kind, HostKind::Unknown)
    }

    fn root(&self) -> &Path {
        &self.0.root
    }

    async fn is_dir(&self, path: &Path) -> bool {
        match &self.0.kind {
            HostKind::Local => path.is_dir(),
            HostKind::Remote(config) => self
                .ssh(config, &format!("test -d {}", quoted(path)))
                .await
                .map(|o| o.status.success())
                .unwrap_or(false),
            HostKind::Unknown => false,
        }
    }

    async fn read_dir(&self, path: &Path) -> Result<Vec<String>> {
        match &self.0.kind {
            HostKind::Local => {
                let entries = std::fs::read_dir(path)
                    .with_context(|| format!("reading directory {}", path.display()))?;
                let mut names = Vec::new();
                for entry in entries {
                    let entry = entry.with_context(|| format!("reading {}", path.display()))?;
                    names.push(entry.file_name().to_string_lossy().into_owned());
                }
                Ok(names)
            }
            HostKind::Remote(config) => {
                let out = self.ssh(config, &format!("ls -1A {}", quoted(path))).await?;
                anyhow::ensure!(
                    out.status.success(),
                    "listing {} on {}: {}",
                    path.display(),
                    self.0.name,
                    String::from_utf8_lossy(&out.stderr).trim()
                );
                Ok(String::from_utf8_lossy(&out.stdout)
                    .lines()
                    .map(str::to_string)
                    .collect())
            }
            HostKind::Unknown => Err(self.not_configured()),
        }
    }

    async fn read_file(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match &self.0.kind {
            HostKind::Local => match std::fs::read(path) {
                Ok(raw) => Ok(Some(raw)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => {
                    Err(e).with_context(|| format!("reading file {}", path.display()))
                }
            },
            HostKind::Remote(config) => {
                let out = self.ssh(config, &format!("cat {}", quoted(path))).await?;
                if out.status.success() {
                    return Ok(Some(out.stdout));
                }
                let stderr = String::from_utf8_lossy(&out.stderr);
                if stderr.contains("No such file or directory") {
                    return Ok(None);
                }
                anyhow::bail!(
                    "reading {} on {}: {}",
                    path.display(),
                    self.0.name,
                    stderr.trim()
                )
            }
            HostKind::Unknown => Err(self.not_configured()),
        }
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<()> {
        match &self.0.kind {
            HostKind::Local => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("creating directory {}", parent.display()))?;
                }
                // Atomic write via temp file then rename.
                let temp = path.with_extension("tmp");
                std::fs::write(&temp, content)
                    .with_context(|| format!("writing temp file {}", temp.display()))?;
                std::fs::rename(&temp, path)
                    .with_context(|| format!("finalizing {}", path.display()))
            }
            HostKind::Remote(config) => {
                let q = quoted(path);
                let command = format!(
                    "mkdir -p {} && cat > {q}.tmp && mv -f {q}.tmp {q}",
                    quoted(path.parent().unwrap_or(Path::new("/")))
                );
                let out = self.ssh_with_stdin(config, &command, content).await?;
                anyhow::ensure!(
                    out.status.success(),
                    "writing {} on {}: {}",
                    path.display(),
                    self.0.name,
                    String::from_utf8_lossy(&out.stderr).trim()
                );
                Ok(())
            }
            HostKind::Unknown => Err(self.not_configured()),
        }
    }

    async fn mkdir_all(&self, path: &Path) -> Result<()> {
        match &self.0.kind {
            HostKind::Local => std::fs::create_dir_all(path)
                .with_context(|| format!("creating directory {}", path.display())),
            HostKind::Remote(config) => {
                let out = self
                    .ssh(config, &format!("mkdir -p {}", quoted(path)))
                    .await?;
                anyhow::ensure!(out.status.success(), "mkdir {} failed", path.display());
                Ok(())
            }
            HostKind::Unknown => Err(self.not_configured()),
        }
    }

    async fn remove_file(&self, path: &Path) -> Result<()> {
        match &self.0.kind {
            HostKind::Local => std::fs::remove_file(path)
                .with_context(|| format!("removing {}", path.display())),
            HostKind::Remote(config) => {
                let out = self.ssh(config, &format!("rm {}", quoted(path))).await?;
                anyhow::ensure!(out.status.success(), "removing {} failed", path.display());
                Ok(())
            }
            HostKind::Unknown => Err(self.not_configured()),
        }
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        match &self.0.kind {
            HostKind::Local => std::fs::rename(from, to).with_context(|| {
                format!("renaming {} to {}", from.display(), to.display())
            }),
            HostKind::Remote(config) => {
                let out = self
                    .ssh(
                        config,
                        &format!("mv -fT {} {}", quoted(from), quoted(to)),
                    )
                    .await?;
                anyhow::ensure!(
                    out.status.success(),
                    "renaming {} on {}: {}",
                    from.display(),
                    self.0.name,
                    String::from_utf8_lossy(&out.stderr).trim()
                );
                Ok(())
            }
            HostKind::Unknown => Err(self.not_configured()),
        }
    }

    async fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        match &self.0.kind {
            HostKind::Local => {
                #[cfg(unix)]
                return std::os::unix::fs::symlink(target, link).with_context(|| {
                    format!("linking {} to {}", link.display(), target.display())
                });
                #[cfg(not(unix))]
                anyhow::bail!("symlinks require a Unix host");
            }
            HostKind::Remote(config) => {
                let out = self
                    .ssh(
                        config,
                        &format!("ln -s {} {}", quoted(target), quoted(link)),
                    )
                    .await?;
                anyhow::ensure!(
                    out.status.success(),
                    "linking {} on {}: {}",
                    link.display(),
                    self.0.name,
                    String::from_utf8_lossy(&out.stderr).trim()
                );
                Ok(())
            }
            HostKind::Unknown => Err(self.not_configured()),
        }
    }

    async fn read_link(&self, path: &Path) -> Result<Option<PathBuf>> {
        match &self.0.kind {
            HostKind::Local => match std::fs::read_link(path) {
                Ok(target) => Ok(Some(target)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(None),
                Err(e) => Err(e).with_context(|| format!("reading link {}", path.display())),
            },
            HostKind::Remote(config) => {
                let out = self
                    .ssh(config, &format!("readlink {}", quoted(path)))
                    .await?;
                if !out.status.success() {
                    return Ok(None);
                }
                let target = String::from_utf8_lossy(&out.stdout).trim().to_string();
                Ok((!target.is_empty()).then(|| PathBuf::from(target)))
            }
            HostKind::Unknown => Err(self.not_configured()),
        }
    }

    async fn run(&self, command: &str) -> Result<Output> {
        match &self.0.kind {
            HostKind::Local => self
                .0
                .runner
                .run("sh", &["-c", command])
                .await
                .with_context(|| format!("running: {command}")),
            HostKind::Remote(config) => self.ssh(config, command).await,
            HostKind::Unknown => Err(self.not_configured()),
        }
    }

    async fn spawn_detached(
        &self,
        argv: &[String],
        env: &[(String, String)],
        cwd: &Path,
        log: &Path,
    ) -> Result<()> {
        anyhow::ensure!(!argv.is_empty(), "empty command line");
        match &self.0.kind {
            HostKind::Local => {
                let open_log = || {
                    std::fs::OpenOptions::new()
                        .create(true)
                        .append(true)
                        .open(log)
                        .with_context(|| format!("opening log file {}", log.display()))
                };
                let mut command = std::process::Command::new(&argv[0]);
                command
                    .args(&argv[1..])
                    .envs(env.iter().map(|(k, v)| (k, v)))
                    .current_dir(cwd)
                    .stdin(std::process::Stdio::null())
                    .stdout(open_log()?)
                    .stderr(open_log()?);
                #[cfg(unix)]
                {
                    use std::os::unix::process::CommandExt;
                    // New process group: the child outlives this tool and
                    // must not die with its terminal.
                    command.process_group(0);
                }
                command
                    .spawn()
                    .with_context(|| format!("spawning {}", argv[0]))?;
                Ok(())
            }
            HostKind::Remote(config) => {
                let env_prefix = env
                    .iter()
                    .map(|(k, v)| format!("{k}={}", shell_quote(v)))
                    .collect::<Vec<_>>()
                    .join(" ");
                let line = argv.iter().map(|a| shell_quote(a)).collect::<Vec<_>>().join(" ");
                let command = format!(
                    "cd {} && nohup env {env_prefix} {line} >> {} 2>&1 < /dev/null &",
                    quoted(cwd),
                    quoted(log),
                );
                let out = self.ssh(config, &command).await?;
                anyhow::ensure!(
                    out.status.success(),
                    "spawning on {}: {}",
                    self.0.name,
                    String::from_utf8_lossy(&out.stderr).trim()
                );
                Ok(())
            }
            HostKind::Unknown => Err(self.not_configured()),
        }
    }
}

// ── Host inventory ────────────────────────────────────────────────────────────

/// Process-wide host cache plus the persisted inventory file.
///
/// Repeated lookups of one name return the same `Host`; removing a host
/// evicts it so a later re-add starts clean.
pub struct HostStore {
    path: PathBuf,
    local_root: PathBuf,
    configs: Mutex<BTreeMap<String, HostConfig>>,
    cache: Mutex<HashMap<String, Host>>,
}

impl HostStore {
    /// Open the inventory at the default path (`~/.geneosctl/hosts.json`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the
    /// inventory file exists but cannot be parsed.
    pub fn new(local_root: PathBuf) -> Result<Self> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Self::with_path(home.join(".geneosctl").join("hosts.json"), local_root)
    }

    /// Open the inventory at an explicit path (used in tests).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn with_path(path: PathBuf, local_root: PathBuf) -> Result<Self> {
        let configs = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading host inventory {}", path.display()))?;
            let list: Vec<HostConfig> = serde_json::from_str(&content)
                .with_context(|| format!("parsing host inventory {}", path.display()))?;
            list.into_iter().map(|c| (c.name.clone(), c)).collect()
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            local_root,
            configs: Mutex::new(configs),
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Add a remote host to the inventory.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::AlreadyExists`] for duplicate names and
    /// [`HostError::InvalidName`] for names colliding with the sentinels.
    pub fn add(&self, config: HostConfig) -> Result<()> {
        if config.name == LOCALHOST || config.name == ALL_HOSTS {
            return Err(HostError::InvalidName(config.name).into());
        }
        {
            let mut configs = lock(&self.configs);
            if configs.contains_key(&config.name) {
                return Err(HostError::AlreadyExists(config.name).into());
            }
            configs.insert(config.name.clone(), config);
        }
        self.save()
    }

    /// Remove a host and evict its cached handle.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotFound`] when the name is not configured.
    pub fn remove(&self, name: &str) -> Result<()> {
        {
            let mut configs = lock(&self.configs);
            if configs.remove(name).is_none() {
                return Err(HostError::NotFound(name.to_string()).into());
            }
        }
        lock(&self.cache).remove(name);
        self.save()
    }

    /// Configured remote hosts, sorted by name.
    #[must_use]
    pub fn list(&self) -> Vec<HostConfig> {
        lock(&self.configs).values().cloned().collect()
    }

    fn save(&self) -> Result<()> {
        let list: Vec<HostConfig> = self.list();
        let content = serde_json::to_string_pretty(&list).context("serializing host inventory")?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        let temp = self.path.with_extension("json.tmp");
        std::fs::write(&temp, &content)
            .with_context(|| format!("writing temp file {}", temp.display()))?;
        std::fs::rename(&temp, &self.path)
            .with_context(|| format!("finalizing {}", self.path.display()))
    }

    fn elevated() -> bool {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            // /proc/self is owned by the effective UID of this process.
            std::fs::metadata("/proc/self")
                .map(|m| m.uid() == 0)
                .unwrap_or(false)
        }
        #[cfg(not(unix))]
        false
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl HostResolver for HostStore {
    type Host = Host;

    fn get(&self, name: &str) -> Host {
        let mut cache = lock(&self.cache);
        if let Some(host) = cache.get(name) {
            return host.clone();
        }
        let host = if name == LOCALHOST {
            Host::local(self.local_root.clone())
        } else if let Some(config) = lock(&self.configs).get(name) {
            Host::remote(config.clone())
        } else {
            // The ALL sentinel lands here too: it exists but never loads,
            // so it can never be executed against by accident.
            Host::unknown(name)
        };
        cache.insert(name.to_string(), host.clone());
        host
    }

    fn all_hosts(&self) -> Vec<Host> {
        let mut hosts = vec![self.get(LOCALHOST)];
        // Elevated execution must not silently fan out to remote hosts
        // configured by an unprivileged user.
        if !Self::elevated() {
            let names: Vec<String> = lock(&self.configs).keys().cloned().collect();
            hosts.extend(names.iter().map(|n| self.get(n)));
        }
        hosts
    }
}
