//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod address;
pub mod component;
pub mod error;
pub mod instance;
pub mod process;
pub mod version;

pub use address::{Address, split_name, valid_instance_name};
pub use component::{ACTIVE_LINK, Component, ComponentKind, PortRange, ProcessMatch, Registry};
pub use error::{AddressError, HostError, PackageError};
pub use instance::Instance;
pub use process::{Outcome, Signal, SignalResult};
pub use version::{ReleaseVersion, parse_version, pick_latest};
