//! Package version resolution and the activation link.
//!
//! The `active_prod` symlink target is the sole persisted version state;
//! there is no database of installed versions, only directory names under
//! the component's package tree.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

use crate::application::ports::HostOps;
use crate::domain::{ACTIVE_LINK, Component, PackageError, pick_latest};

/// Outcome of an activation-link update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The link now points at `version` and did not before.
    Updated { version: String },
    /// The link already pointed at `version`, or pointed elsewhere and
    /// `overwrite` was off; nothing was touched.
    Unchanged { version: String },
}

/// Select the "latest" version directory under `dir` on `host`.
///
/// Candidates are the subdirectory names (plain files such as downloaded
/// archives never qualify), reduced by the optional `filter` regex and
/// the `exclude` name predicate, then ordered by the numeric-tuple rule
/// in [`crate::domain::version`]. Returns an empty string when nothing
/// qualifies; a missing directory reads as empty, not as an error.
pub async fn latest<H: HostOps>(
    host: &H,
    dir: &Path,
    filter: Option<&Regex>,
    exclude: &dyn Fn(&str) -> bool,
) -> Result<String> {
    let entries = host.read_dir(dir).await.unwrap_or_default();
    let mut candidates = Vec::new();
    for name in &entries {
        if let Some(re) = filter
            && !re.is_match(name)
        {
            continue;
        }
        if exclude(name) {
            continue;
        }
        if host.is_dir(&dir.join(name)).await {
            candidates.push(name.as_str());
        }
    }
    Ok(pick_latest(candidates))
}

/// Version directory the activation link currently points at, or `None`
/// when the link is absent (callers treat that as "package not currently
/// active", never as corruption).
pub async fn active_version<H: HostOps>(host: &H, component: &Component) -> Result<Option<String>> {
    let link = host
        .root()
        .join(component.packages_dir())
        .join(ACTIVE_LINK);
    let target = host.read_link(&link).await?;
    Ok(target.and_then(|t| {
        t.file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }))
}

/// Point the activation link at a version.
///
/// `version` may be `latest` (or empty) to resolve through [`latest`],
/// optionally narrowed by `filter`. An existing link pointing elsewhere
/// is only replaced when `overwrite` is set. The replacement is atomic:
/// a temporary link is created and renamed over the old one, so no
/// window exists with no link at all.
///
/// # Errors
///
/// Returns [`PackageError::NotFound`] when nothing resolves (any existing
/// link is left untouched) and [`PackageError::NoSuchVersion`] when an
/// explicit version is not installed.
pub async fn update<H: HostOps>(
    host: &H,
    component: &Component,
    version: &str,
    filter: Option<&Regex>,
    link_name: &str,
    overwrite: bool,
) -> Result<UpdateOutcome> {
    let base = host.root().join(component.packages_dir());

    let resolved = if version.is_empty() || version == "latest" {
        let v = latest(host, &base, filter, &|name: &str| {
            name == link_name || name.starts_with('.')
        })
        .await?;
        if v.is_empty() {
            return Err(PackageError::NotFound.into());
        }
        v
    } else {
        if !host.is_dir(&base.join(version)).await {
            return Err(PackageError::NoSuchVersion(version.to_string()).into());
        }
        version.to_string()
    };

    let link = base.join(link_name);
    let current = host
        .read_link(&link)
        .await
        .with_context(|| format!("reading {} on {}", link.display(), host.name()))?;
    let current = current.map(|t| resolve_target(&base, &t));

    let target = base.join(&resolved);
    if current.as_deref() == Some(target.as_path()) {
        return Ok(UpdateOutcome::Unchanged { version: resolved });
    }
    if current.is_some() && !overwrite {
        return Ok(UpdateOutcome::Unchanged { version: resolved });
    }

    let staging = base.join(format!(".{link_name}.new"));
    let _ = host.remove_file(&staging).await;
    host.symlink(Path::new(&resolved), &staging)
        .await
        .with_context(|| format!("creating {} on {}", staging.display(), host.name()))?;
    host.rename(&staging, &link)
        .await
        .with_context(|| format!("activating {} on {}", link.display(), host.name()))?;
    Ok(UpdateOutcome::Updated { version: resolved })
}

/// Links are written relative to the package tree; normalise whatever the
/// filesystem reports back to an absolute path under `base`.
fn resolve_target(base: &Path, target: &Path) -> PathBuf {
    if target.is_absolute() {
        target.to_path_buf()
    } else {
        base.join(target)
    }
}
