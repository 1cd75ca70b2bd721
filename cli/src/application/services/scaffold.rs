//! Directory layout scaffolding under a host's installation root.

use anyhow::{Context, Result};

use crate::application::ports::HostOps;
use crate::domain::Registry;

/// Create every component directory under `host`'s installation root.
///
/// Creation is idempotent: directories that already exist are left
/// alone, so this is safe to run against a populated root.
///
/// # Errors
///
/// Returns an error when a directory cannot be created, naming the
/// path and the host.
pub async fn ensure_layout<H: HostOps>(registry: &Registry, host: &H) -> Result<()> {
    for dir in registry.required_dirs() {
        let path = host.root().join(dir);
        host.mkdir_all(&path)
            .await
            .with_context(|| format!("creating {} on {}", path.display(), host.name()))?;
    }
    Ok(())
}
