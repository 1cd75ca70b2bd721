//! Application layer — port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain` — never on `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod cache;
pub mod ports;
pub mod services;

pub use cache::InstanceCache;
pub use ports::{
    ALL_HOSTS, CommandRunner, HostOps, HostResolver, LOCALHOST, ProcessLocator, Reporter,
    Settings, SettingsStore,
};
