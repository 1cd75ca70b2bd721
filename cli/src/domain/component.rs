//! Component descriptors and the explicit component registry.
//!
//! A `Component` is the static type descriptor for a class of instances
//! (Gateway, Licd, ...). The registry is built once at startup in a fixed
//! declaration order and is read-only afterwards; component identity from
//! then on is `Arc` pointer identity, never string comparison.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::Signal;

/// Closed set of instance types managed by this tool.
///
/// `None` and `All` are pseudo types: they never bear processes and exist
/// only so that command-line tokens like `all` resolve through the same
/// alias machinery as real types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Gateway,
    Licd,
    Netprobe,
    San,
    Webserver,
    None,
    All,
}

/// How a candidate process is matched against an instance during discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessMatch {
    /// Executable basename starts with the given prefix and one bare
    /// argument equals the instance name exactly.
    BinaryPrefix(&'static str),
    /// Java-hosted component: one argument is
    /// `-Dworking.directory=<home>` and another ends with the jar name.
    JavaJar(&'static str),
}

/// Static descriptor for one instance type.
#[derive(Debug)]
pub struct Component {
    pub kind: ComponentKind,
    /// Canonical name, also the on-disk directory stem (`gateway` →
    /// `<root>/gateway/gateways/<name>`).
    pub name: &'static str,
    /// Alias strings accepted on the command line, canonical name excluded.
    pub aliases: &'static [&'static str],
    /// Whether instances of this type bear a process.
    pub real: bool,
    /// Listening-port allocation range, e.g. `"7039,7100-"`.
    pub port_range: &'static str,
    /// Process discovery rule; irrelevant for pseudo types.
    pub process_match: ProcessMatch,
    /// Signal delivered on `reload`, or `None` when unsupported.
    pub reload_signal: Option<Signal>,
    /// Glob patterns removed by a clean operation, relative to the home.
    pub cleanup_globs: &'static [&'static str],
    /// Default settings seeded into a new instance's configuration.
    /// Values may reference `{name}` and `{home}`.
    pub defaults: &'static [(&'static str, &'static str)],
    /// Directories that must exist under a host root before instances of
    /// this type can be created, relative to the root.
    pub required_dirs: &'static [&'static str],
}

impl Component {
    /// Directory holding this component's instances under a host root,
    /// relative to the root (`gateway/gateways`).
    #[must_use]
    pub fn instances_dir(&self) -> String {
        format!("{}/{}s", self.name, self.name)
    }

    /// Package tree for this component, relative to the root.
    #[must_use]
    pub fn packages_dir(&self) -> String {
        format!("packages/{}", self.name)
    }
}

/// Name of the symlink designating the active package version.
pub const ACTIVE_LINK: &str = "active_prod";

const GATEWAY: Component = Component {
    kind: ComponentKind::Gateway,
    name: "gateway",
    aliases: &["gateways", "gate", "gw"],
    real: true,
    port_range: "7039,7100-",
    process_match: ProcessMatch::BinaryPrefix("gateway2"),
    reload_signal: Some(Signal::Usr1),
    cleanup_globs: &["*.old", "*.history", "licences.cache", "cache/"],
    defaults: &[
        ("binary", "gateway2.linux_64"),
        ("logfile", "gateway.log"),
        ("setup", "gateway.setup.xml"),
    ],
    required_dirs: &["gateway", "gateway/gateways", "packages/gateway"],
};

const LICD: Component = Component {
    kind: ComponentKind::Licd,
    name: "licd",
    aliases: &["licds", "lic"],
    real: true,
    port_range: "7041",
    process_match: ProcessMatch::BinaryPrefix("licd"),
    reload_signal: None,
    cleanup_globs: &["*.old"],
    defaults: &[("binary", "licd.linux_64"), ("logfile", "licd.log")],
    required_dirs: &["licd", "licd/licds", "packages/licd"],
};

const NETPROBE: Component = Component {
    kind: ComponentKind::Netprobe,
    name: "netprobe",
    aliases: &["netprobes", "probe", "probes"],
    real: true,
    port_range: "7036,7100-",
    process_match: ProcessMatch::BinaryPrefix("netprobe"),
    reload_signal: Some(Signal::Usr1),
    cleanup_globs: &["*.old", "*.snooze", "*.user_assignment"],
    defaults: &[("binary", "netprobe.linux_64"), ("logfile", "netprobe.log")],
    required_dirs: &["netprobe", "netprobe/netprobes", "packages/netprobe"],
};

const SAN: Component = Component {
    kind: ComponentKind::San,
    name: "san",
    aliases: &["sans"],
    real: true,
    port_range: "7036,7100-",
    // A SAN runs the netprobe binary under its own home.
    process_match: ProcessMatch::BinaryPrefix("netprobe"),
    reload_signal: Some(Signal::Usr1),
    cleanup_globs: &["*.old", "*.snooze", "*.user_assignment"],
    defaults: &[
        ("binary", "netprobe.linux_64"),
        ("logfile", "san.log"),
        ("setup", "netprobe.setup.xml"),
    ],
    required_dirs: &["san", "san/sans", "packages/netprobe"],
};

const WEBSERVER: Component = Component {
    kind: ComponentKind::Webserver,
    name: "webserver",
    aliases: &["webservers", "webdashboard", "dashboards"],
    real: true,
    port_range: "8080,8100-",
    process_match: ProcessMatch::JavaJar("geneos-web-server.jar"),
    reload_signal: None,
    cleanup_globs: &["webapps/*.tmp"],
    defaults: &[("logfile", "webserver.log"), ("maxmem", "1024m")],
    required_dirs: &["webserver", "webserver/webservers", "packages/webserver"],
};

const NONE: Component = Component {
    kind: ComponentKind::None,
    name: "none",
    aliases: &["any"],
    real: false,
    port_range: "",
    process_match: ProcessMatch::BinaryPrefix(""),
    reload_signal: None,
    cleanup_globs: &[],
    defaults: &[],
    required_dirs: &[],
};

const ALL: Component = Component {
    kind: ComponentKind::All,
    name: "all",
    aliases: &[],
    real: false,
    port_range: "",
    process_match: ProcessMatch::BinaryPrefix(""),
    reload_signal: None,
    cleanup_globs: &[],
    defaults: &[],
    required_dirs: &[],
};

/// Read-only component registry, built once at startup.
pub struct Registry {
    components: Vec<Arc<Component>>,
    /// Operator-declared names that may not be used as instance names,
    /// on top of the component aliases.
    extra_reserved: Vec<String>,
}

impl Registry {
    /// Build the registry with every built-in component, in fixed
    /// declaration order (licd before the types that license against it).
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            components: vec![
                Arc::new(LICD),
                Arc::new(GATEWAY),
                Arc::new(NETPROBE),
                Arc::new(SAN),
                Arc::new(WEBSERVER),
                Arc::new(NONE),
                Arc::new(ALL),
            ],
            extra_reserved: Vec::new(),
        }
    }

    /// Declare an additional reserved name.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.extra_reserved.push(name.into());
    }

    /// Case-sensitive alias lookup. Returns `None` both for unknown tokens
    /// and for the pseudo types (`none`, `all`, `any`), which mean "no type
    /// filter". Callers that need to know whether the token *was* an alias
    /// at all use [`Registry::is_alias`].
    #[must_use]
    pub fn lookup(&self, token: &str) -> Option<Arc<Component>> {
        self.components
            .iter()
            .find(|c| c.name == token || c.aliases.contains(&token))
            .filter(|c| c.real)
            .cloned()
    }

    /// Whether `token` matches any registered component name or alias,
    /// pseudo types included.
    #[must_use]
    pub fn is_alias(&self, token: &str) -> bool {
        self.components
            .iter()
            .any(|c| c.name == token || c.aliases.contains(&token))
    }

    /// Whether `name` may not be used as an instance name.
    #[must_use]
    pub fn is_reserved(&self, name: &str) -> bool {
        self.is_alias(name) || self.extra_reserved.iter().any(|r| r == name)
    }

    /// Process-bearing components, in registration order.
    pub fn real_components(&self) -> impl Iterator<Item = &Arc<Component>> {
        self.components.iter().filter(|c| c.real)
    }

    /// Directories that must exist under a host root, deduplicated across
    /// all real components, in registration order.
    #[must_use]
    pub fn required_dirs(&self) -> Vec<&'static str> {
        let mut seen = BTreeSet::new();
        let mut dirs = Vec::new();
        for c in self.real_components() {
            for d in c.required_dirs {
                if seen.insert(*d) {
                    dirs.push(*d);
                }
            }
        }
        dirs
    }
}

// ── Port ranges ───────────────────────────────────────────────────────────────

/// Upper bound for open-ended ranges; ports above this are ephemeral.
const PORT_CEILING: u16 = 49151;

/// A comma-separated list of ports and inclusive ranges, e.g.
/// `"7039,7100-7110"` or `"7100-"` (open-ended, capped at 49151).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortRange {
    spans: Vec<(u16, u16)>,
}

impl PortRange {
    /// Parse a range specification. Malformed entries are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if any entry is not a port or `LOW-[HIGH]` pair,
    /// or if a range is inverted.
    pub fn parse(spec: &str) -> anyhow::Result<Self> {
        let mut spans = Vec::new();
        for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if let Some((lo, hi)) = part.split_once('-') {
                let lo: u16 = lo.trim().parse().map_err(|_| bad_range(part))?;
                let hi: u16 = match hi.trim() {
                    "" => PORT_CEILING,
                    h => h.parse().map_err(|_| bad_range(part))?,
                };
                anyhow::ensure!(lo <= hi, "inverted port range {part:?}");
                spans.push((lo, hi));
            } else {
                let p: u16 = part.parse().map_err(|_| bad_range(part))?;
                spans.push((p, p));
            }
        }
        Ok(Self { spans })
    }

    /// First port in declaration order not present in `used`, or 0 when
    /// the whole range is exhausted.
    #[must_use]
    pub fn next_port(&self, used: &BTreeSet<u16>) -> u16 {
        for &(lo, hi) in &self.spans {
            for p in lo..=hi {
                if !used.contains(&p) {
                    return p;
                }
            }
        }
        0
    }
}

fn bad_range(part: &str) -> anyhow::Error {
    anyhow::anyhow!("malformed port range entry {part:?}")
}
