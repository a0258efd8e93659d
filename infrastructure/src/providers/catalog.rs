//! HTTP catalog source.
//!
//! Fetches the model list from an OpenAI-compatible `/models` endpoint,
//! for deployments that don't pin a registry in `flare.toml`. Backends
//! reached this way all accept a temperature, so every fetched entry
//! reports temperature support.

use super::http_invoker::ProviderEndpoint;
use crate::registry::cached::{CatalogError, CatalogSource};
use async_trait::async_trait;
use flare_domain::{ModelId, ModelInfo};
use tracing::debug;

/// [`CatalogSource`] over an endpoint's `/models` listing
pub struct HttpCatalogSource {
    client: reqwest::Client,
    endpoint: ProviderEndpoint,
}

impl HttpCatalogSource {
    pub fn new(endpoint: ProviderEndpoint) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self) -> Result<Vec<ModelInfo>, CatalogError> {
        let url = format!("{}/models", self.endpoint.base_url.trim_end_matches('/'));
        debug!("Fetching model catalog from {}", url);

        let mut request = self.client.get(&url);
        if let Some(key) = &self.endpoint.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::Fetch(e.to_string()))?;
        if !response.status().is_success() {
            return Err(CatalogError::Fetch(format!(
                "{} returned status {}",
                url,
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CatalogError::Fetch(e.to_string()))?;

        Ok(parse_model_listing(&body))
    }
}

/// Extract model ids from a `/models` response body
fn parse_model_listing(body: &serde_json::Value) -> Vec<ModelInfo> {
    body.get("data")
        .and_then(|d| d.as_array())
        .map(|models| {
            models
                .iter()
                .filter_map(|m| m.get("id").and_then(|id| id.as_str()))
                .filter_map(ModelId::try_new)
                .map(ModelInfo::new)
                .collect()
        })
        .unwrap_or_default()
}
