//! Use-case orchestration over the port traits.
//!
//! Imports only from `crate::domain` and `crate::application::ports`;
//! every service is generic over the ports and tested with stubs.

pub mod expand;
pub mod fanout;
pub mod lifecycle;
pub mod packages;
pub mod scaffold;
