//! Application context — shared state handed to every command handler.
//!
//! `AppContext` holds the collaborators each command needs: output,
//! component registry, host inventory, instance cache, process locator
//! and settings store. Adding a new cross-cutting concern requires only
//! one field change here — zero command signatures change.

use std::path::PathBuf;

use anyhow::Result;

use crate::application::InstanceCache;
use crate::domain::Registry;
use crate::infra::host::HostStore;
use crate::infra::procscan::ProcScanner;
use crate::infra::settings::JsonSettings;
use crate::output::OutputContext;

/// Top-level CLI flags consumed by `AppContext::new`.
pub struct AppFlags {
    /// Turn off ANSI colors.
    pub no_color: bool,
    /// Print errors only.
    pub quiet: bool,
    /// Skip interactive prompts (also set by `CI` / `GENEOSCTL_YES` env vars).
    pub yes: bool,
    /// Installation root on the local host.
    pub root: PathBuf,
}

/// Everything a command handler needs, built once in `Cli::run()` and
/// borrowed for the life of the invocation.
pub struct AppContext {
    /// Terminal output (colors, glyphs, quiet mode).
    pub output: OutputContext,
    /// Built-in component registry.
    pub registry: Registry,
    /// Host inventory and resolver.
    pub hosts: HostStore,
    /// Process-wide instance identity cache.
    pub cache: InstanceCache,
    /// Process discovery strategy.
    pub locator: ProcScanner,
    /// Per-instance settings persistence.
    pub settings: JsonSettings,
    /// Skip prompts and take defaults when set.
    pub non_interactive: bool,
}

impl AppContext {
    /// Build the context from parsed CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the host inventory cannot be opened (home
    /// directory not found, or a corrupt inventory file).
    pub fn new(flags: AppFlags) -> Result<Self> {
        let ci_env = std::env::var("CI").is_ok() || std::env::var("GENEOSCTL_YES").is_ok();
        let non_interactive = flags.yes || ci_env;

        let mut registry = Registry::builtin();
        // Site-local reserved words, e.g. names claimed by other tooling.
        if let Ok(extra) = std::env::var("GENEOSCTL_RESERVED") {
            for name in extra.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                registry.reserve(name);
            }
        }

        Ok(Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            registry,
            hosts: HostStore::new(flags.root)?,
            cache: InstanceCache::default(),
            locator: ProcScanner,
            settings: JsonSettings,
            non_interactive,
        })
    }

    /// Ask the user to confirm a destructive action.
    ///
    /// Non-interactive runs (CI, `--yes`, `GENEOSCTL_YES`) answer with
    /// `default` immediately instead of prompting.
    ///
    /// # Errors
    ///
    /// Returns an error when the terminal prompt itself fails, e.g. with
    /// no TTY attached.
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}
