//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` uses tokio for process execution with a
//! guaranteed timeout and kill. Remote hosts run every operation through
//! it (as `ssh` invocations), so the timeout doubles as the only bound on
//! a wedged remote session.

use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};

use crate::application::ports::CommandRunner;

/// Default timeout for one command round trip, local or over SSH.
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(30);

/// Production `CommandRunner`.
///
/// `tokio::time::timeout` around `.output().await` does not kill the
/// child when the timeout fires — the future is dropped but the OS
/// process keeps running. `tokio::select!` with an explicit
/// `child.kill()` guarantees termination.
#[derive(Debug, Clone)]
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TokioCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CMD_TIMEOUT)
    }
}

/// Read one captured stream to EOF. Read errors yield whatever arrived
/// before the failure.
async fn drain(stream: Option<impl AsyncRead + Unpin>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        let _ = stream.read_to_end(&mut buf).await;
    }
    buf
}

fn spawn(program: &str, args: &[&str], piped_stdin: bool) -> Result<Child> {
    Command::new(program)
        .args(args)
        .stdin(if piped_stdin { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to spawn {program}"))
}

impl TokioCommandRunner {
    async fn collect(
        program: &str,
        mut child: Child,
        stdin: Option<&[u8]>,
        timeout: Duration,
    ) -> Result<Output> {
        if let Some(input) = stdin {
            if let Some(mut handle) = child.stdin.take() {
                let _ = handle.write_all(input).await;
            }
            // Dropping the handle closes the pipe so the child sees EOF.
        }

        let out = child.stdout.take();
        let err = child.stderr.take();
        let wait_and_capture = async {
            let (status, stdout, stderr) = tokio::join!(child.wait(), drain(out), drain(err));
            let status = status.with_context(|| format!("waiting for {program}"))?;
            Ok(Output { status, stdout, stderr })
        };

        tokio::select! {
            result = wait_and_capture => result,
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                anyhow::bail!("{program} timed out after {}s", timeout.as_secs())
            }
        }
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        let child = spawn(program, args, false)?;
        Self::collect(program, child, None, timeout).await
    }

    async fn run_with_stdin(&self, program: &str, args: &[&str], input: &[u8]) -> Result<Output> {
        let child = spawn(program, args, true)?;
        Self::collect(program, child, Some(input), self.timeout).await
    }
}
