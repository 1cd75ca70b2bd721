//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to
//! `anyhow::Error` via the `?` operator.

use thiserror::Error;

// ── Address errors ────────────────────────────────────────────────────────────

/// Errors raised while turning CLI tokens into instance addresses.
#[derive(Debug, Error)]
pub enum AddressError {
    #[error("{0:?} is a reserved name and cannot name an instance")]
    Reserved(String),

    #[error("no matching instances found")]
    NoMatches,
}

// ── Host errors ───────────────────────────────────────────────────────────────

/// Errors related to host resolution and the host inventory.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("host '{0}' is not configured. Add it with: geneosctl host add {0}")]
    NotFound(String),

    #[error("host '{0}' already exists. Remove it first: geneosctl host rm {0}")]
    AlreadyExists(String),

    #[error("'{0}' is not a valid host name")]
    InvalidName(String),
}

// ── Package errors ────────────────────────────────────────────────────────────

/// Errors related to package version resolution and activation.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("no matching package version found")]
    NotFound,

    #[error("version {0:?} is not installed")]
    NoSuchVersion(String),
}
