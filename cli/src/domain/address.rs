//! Instance address grammar: `[TYPE:]NAME[@HOST]`.
//!
//! Pure syntax — no existence checks, no I/O. The wildcard expander gives
//! parsed addresses their meaning.

use std::sync::Arc;

use crate::domain::component::{Component, Registry};

/// Parse result of one CLI token. Never persisted.
#[derive(Debug, Clone)]
pub struct Address {
    /// `None` when the token carried no recognised `TYPE:` prefix.
    pub component: Option<Arc<Component>>,
    /// Bare instance name; empty for `@HOST`-only tokens, which downstream
    /// means "all instances on HOST".
    pub name: String,
    /// Host name, the caller-supplied default when no `@HOST` suffix.
    pub host: String,
}

/// Split one token into component, bare name and host.
///
/// The host suffix splits on the **last** `@` so that names containing `@`
/// in earlier positions stay intact. A `TYPE:` prefix is only stripped when
/// the prefix matches a registered alias; otherwise the whole remainder is
/// the bare name.
#[must_use]
pub fn split_name(registry: &Registry, token: &str, default_host: &str) -> Address {
    let (rest, host) = match token.rsplit_once('@') {
        Some((rest, host)) if !host.is_empty() => (rest, host.to_string()),
        _ => (token, default_host.to_string()),
    };

    if let Some((prefix, name)) = rest.split_once(':')
        && let Some(component) = registry.lookup(prefix)
    {
        return Address {
            component: Some(component),
            name: name.to_string(),
            host,
        };
    }

    Address {
        component: None,
        name: rest.to_string(),
        host,
    }
}

/// Syntactic validity of an instance name: led by an ASCII alphanumeric,
/// followed by alphanumerics, `-`, `_` or `.`. Tokens failing this are
/// never treated as addresses.
#[must_use]
pub fn valid_instance_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphanumeric() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
