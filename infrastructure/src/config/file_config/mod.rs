//! Typed view of `flare.toml`
//!
//! # Example
//!
//! ```toml
//! [[registry.models]]
//! id = "mistral"
//!
//! [[registry.models]]
//! id = "stable-code"
//! supports_temperature = false
//! provider = "local"
//!
//! [dispatch]
//! timeout_secs = 30
//! max_retries = 2
//! backoff_ms = 500
//!
//! [synthesis]
//! model = "mistral"
//!
//! [providers]
//! default = "local"
//!
//! [providers.endpoints.local]
//! base_url = "http://localhost:11434/v1"
//!
//! [providers.routing]
//! "gpt-4o" = "openai"
//! ```

mod dispatch;
mod providers;
mod registry;

pub use dispatch::FileDispatchConfig;
pub use providers::{FileEndpointConfig, FileProvidersConfig};
pub use registry::{FileModelEntry, FileRegistryConfig};

use serde::{Deserialize, Serialize};

/// Root configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub registry: FileRegistryConfig,
    pub dispatch: FileDispatchConfig,
    pub synthesis: FileSynthesisConfig,
    pub providers: FileProvidersConfig,
}

/// `[synthesis]` section — reduction synthesis call routing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSynthesisConfig {
    /// Fixed model for summarize/vote/difference/expand/filter synthesis
    /// calls; when unset, the first model of the working set is used.
    pub model: Option<String>,
}
