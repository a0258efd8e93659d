//! Model registry configuration from TOML (`[registry]` section)

use flare_domain::{ModelInfo, StaticModelRegistry};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// `[registry]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRegistryConfig {
    /// Known models; an empty list means the registry is fetched from the
    /// default provider's catalog endpoint instead.
    pub models: Vec<FileModelEntry>,
    /// Cache lifetime in seconds when a catalog endpoint backs the registry
    pub ttl_secs: Option<u64>,
}

/// One `[[registry.models]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileModelEntry {
    pub id: String,
    #[serde(default = "default_true")]
    pub supports_temperature: bool,
    /// Endpoint name overriding `[providers.routing]` for this model
    #[serde(default)]
    pub provider: Option<String>,
}

fn default_true() -> bool {
    true
}

impl FileRegistryConfig {
    /// Build the static registry, skipping entries with empty ids.
    pub fn to_registry(&self) -> StaticModelRegistry {
        let mut entries = Vec::with_capacity(self.models.len());
        for entry in &self.models {
            if entry.id.trim().is_empty() {
                warn!("registry.models: skipping entry with empty id");
                continue;
            }
            let mut info = ModelInfo::new(entry.id.trim());
            info.supports_temperature = entry.supports_temperature;
            info.provider = entry.provider.clone();
            entries.push(info);
        }
        StaticModelRegistry::new(entries)
    }
}
