//! JSON-backed per-instance settings persistence.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use crate::application::ports::{HostOps, Settings, SettingsStore};
use crate::domain::Instance;

/// Stores settings as one pretty-printed JSON object per instance home
/// (`<home>/<component>.json`). A missing file means the instance runs on
/// its component defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSettings;

impl SettingsStore for JsonSettings {
    async fn load<H: HostOps>(&self, host: &H, instance: &Instance) -> Result<Settings> {
        let path = instance.settings_file();
        // An absent file means defaults; a failed read must surface, or a
        // transient failure would look like a fresh instance and a later
        // save would clobber the real file.
        match host
            .read_file(&path)
            .await
            .with_context(|| format!("reading settings file {}", path.display()))?
        {
            Some(raw) => {
                let map: BTreeMap<String, serde_json::Value> = serde_json::from_slice(&raw)
                    .with_context(|| format!("parsing settings file {}", path.display()))?;
                Ok(Settings::from_map(map))
            }
            None => Ok(Settings::defaults_for(instance)),
        }
    }

    async fn save<H: HostOps>(
        &self,
        host: &H,
        instance: &Instance,
        settings: &Settings,
    ) -> Result<()> {
        let map: BTreeMap<_, _> = settings.clone().into_map();
        let content =
            serde_json::to_vec_pretty(&map).context("serializing instance settings")?;
        host.write_file(&instance.settings_file(), &content)
            .await
            .with_context(|| format!("saving settings for {instance}"))
    }
}
