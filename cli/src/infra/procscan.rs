//! Process discovery by scanning a `/proc`-style process table.
//!
//! Works identically on local and remote hosts because the scan goes
//! through the host capability surface: reading `/proc` locally is plain
//! file IO, remotely it is `ls` and `cat` over SSH.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::{HostOps, ProcessLocator};
use crate::domain::{Instance, ProcessMatch, Signal, SignalResult};

/// The default [`ProcessLocator`]: match instances against `/proc/<pid>/cmdline`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcScanner;

/// True when a NUL-split command line belongs to `instance`.
///
/// Binaries are matched by the basename of `argv[0]` plus the instance
/// name appearing as a bare argument. Java components are matched by the
/// jar name plus a `-Dworking.directory=<home>` property, since every
/// web server runs the same jar.
fn matches(instance: &Instance, args: &[String]) -> bool {
    let Some(argv0) = args.first() else {
        return false;
    };
    match instance.component.process_match {
        ProcessMatch::BinaryPrefix(prefix) => {
            let basename = Path::new(argv0)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            basename.starts_with(prefix)
                && args[1..]
                    .iter()
                    .any(|a| !a.starts_with('-') && a == &instance.name)
        }
        ProcessMatch::JavaJar(jar) => {
            let wd = format!("-Dworking.directory={}", instance.home.display());
            args[1..].iter().any(|a| a == &wd)
                && args[1..].iter().any(|a| a.ends_with(jar))
        }
    }
}

impl ProcessLocator for ProcScanner {
    async fn find_pid<H: HostOps>(&self, host: &H, instance: &Instance) -> Result<Option<u32>> {
        let proc_dir = Path::new("/proc");
        let entries = host
            .read_dir(proc_dir)
            .await
            .with_context(|| format!("scanning process table on {}", host.name()))?;

        let mut pids: Vec<u32> = entries.iter().filter_map(|e| e.parse().ok()).collect();
        pids.sort_unstable();

        for pid in pids {
            let cmdline: PathBuf = proc_dir.join(pid.to_string()).join("cmdline");
            // Processes exit mid-scan; a vanished entry is not an error.
            // A failed read is: it could hide a still-running process.
            let Some(raw) = host
                .read_file(&cmdline)
                .await
                .with_context(|| format!("scanning process table on {}", host.name()))?
            else {
                continue;
            };
            let args: Vec<String> = raw
                .split(|b| *b == 0)
                .filter(|part| !part.is_empty())
                .map(|part| String::from_utf8_lossy(part).into_owned())
                .collect();
            if matches(instance, &args) {
                return Ok(Some(pid));
            }
        }
        Ok(None)
    }

    async fn signal<H: HostOps>(
        &self,
        host: &H,
        pid: u32,
        signal: Signal,
    ) -> Result<SignalResult> {
        let out = host
            .run(&format!("kill -{} {pid}", signal.name()))
            .await
            .with_context(|| format!("delivering {signal} to pid {pid} on {}", host.name()))?;
        if out.status.success() {
            return Ok(SignalResult::Delivered);
        }
        let stderr = String::from_utf8_lossy(&out.stderr);
        if stderr.contains("No such process") {
            return Ok(SignalResult::NoSuchProcess);
        }
        anyhow::bail!(
            "kill -{} {pid} failed on {}: {}",
            signal.name(),
            host.name(),
            stderr.trim()
        )
    }
}
