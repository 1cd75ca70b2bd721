//! Instance identity: one named, typed unit bound to a host and a home.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::component::Component;

/// One running or installed unit of the managed product.
///
/// The home directory is derived from the host root, the component and the
/// bare name; no two distinct (component, name, host) triples can resolve
/// to the same directory.
#[derive(Debug, Clone)]
pub struct Instance {
    pub component: Arc<Component>,
    /// Bare name, unique within (component, host).
    pub name: String,
    /// Logical host name (`localhost` or a remote alias).
    pub host: String,
    /// Home directory on that host.
    pub home: PathBuf,
}

impl Instance {
    #[must_use]
    pub fn new(component: Arc<Component>, name: &str, host: &str, root: &Path) -> Self {
        let home = root.join(component.instances_dir()).join(name);
        Self {
            component,
            name: name.to_string(),
            host: host.to_string(),
            home,
        }
    }

    /// Full identity used in logs and error messages: `type:name@host`.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}:{}@{}", self.component.name, self.name, self.host)
    }

    /// Per-instance settings file inside the home directory.
    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.home.join(format!("{}.json", self.component.name))
    }

    /// Log file the detached process writes to, from the `logfile` default
    /// when the settings carry no override.
    #[must_use]
    pub fn default_log_file(&self) -> PathBuf {
        let name = self
            .component
            .defaults
            .iter()
            .find(|(k, _)| *k == "logfile")
            .map_or("instance.log", |(_, v)| *v);
        self.home.join(name)
    }
}

impl std::fmt::Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id())
    }
}
