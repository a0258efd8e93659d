//! Provider endpoint configuration from TOML (`[providers]` section)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `[providers]` section — endpoint table and model routing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Endpoint used when `[providers.routing]` has no entry for a model
    pub default: Option<String>,
    /// Named endpoints, `[providers.endpoints.<name>]`
    pub endpoints: HashMap<String, FileEndpointConfig>,
    /// Explicit model id → endpoint name mapping
    pub routing: HashMap<String, String>,
}

/// One `[providers.endpoints.<name>]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEndpointConfig {
    /// Base URL of an OpenAI-compatible API, e.g. `http://localhost:11434/v1`
    pub base_url: String,
    /// Environment variable holding the bearer token, if the endpoint
    /// needs one
    #[serde(default)]
    pub api_key_env: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_and_routing_parse() {
        let toml_str = r#"
default = "local"

[endpoints.local]
base_url = "http://localhost:11434/v1"

[endpoints.openai]
base_url = "https://api.openai.com/v1"
api_key_env = "OPENAI_API_KEY"

[routing]
"gpt-4o" = "openai"
"#;
        let config: FileProvidersConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.endpoints.len(), 2);
        assert_eq!(
            config.endpoints["openai"].api_key_env.as_deref(),
            Some("OPENAI_API_KEY")
        );
        assert_eq!(config.routing["gpt-4o"], "openai");
    }
}
