//! HTTP model invoker adapter.
//!
//! Implements the [`ModelInvoker`] port against OpenAI-compatible
//! `/chat/completions` endpoints. Which endpoint serves a model is an
//! explicit lookup: the `[providers.routing]` table first, then the
//! configured default endpoint — never guessed from the model name.

use crate::config::file_config::FileProvidersConfig;
use async_trait::async_trait;
use flare_application::{InvokeError, ModelInvoker};
use flare_domain::ModelId;
use flare_domain::util::truncate_str;
use serde_json::json;
use std::collections::HashMap;
use tracing::debug;

/// One resolvable endpoint
#[derive(Debug, Clone)]
pub struct ProviderEndpoint {
    pub name: String,
    pub base_url: String,
    pub api_key: Option<String>,
}

/// [`ModelInvoker`] adapter over HTTP
pub struct HttpModelInvoker {
    client: reqwest::Client,
    endpoints: HashMap<String, ProviderEndpoint>,
    routing: HashMap<String, String>,
    default_endpoint: Option<String>,
}

impl HttpModelInvoker {
    pub fn new(
        endpoints: Vec<ProviderEndpoint>,
        routing: HashMap<String, String>,
        default_endpoint: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints: endpoints
                .into_iter()
                .map(|e| (e.name.clone(), e))
                .collect(),
            routing,
            default_endpoint,
        }
    }

    /// Build from the `[providers]` config section, reading bearer tokens
    /// from the configured environment variables.
    pub fn from_config(config: &FileProvidersConfig) -> Self {
        let endpoints = config
            .endpoints
            .iter()
            .map(|(name, endpoint)| ProviderEndpoint {
                name: name.clone(),
                base_url: endpoint.base_url.clone(),
                api_key: endpoint
                    .api_key_env
                    .as_ref()
                    .and_then(|var| std::env::var(var).ok()),
            })
            .collect();

        Self::new(endpoints, config.routing.clone(), config.default.clone())
    }

    /// The default endpoint, when one is configured and present
    pub fn default_endpoint(&self) -> Option<&ProviderEndpoint> {
        self.default_endpoint
            .as_ref()
            .and_then(|name| self.endpoints.get(name))
    }

    /// Resolve the endpoint serving `model`.
    ///
    /// Priority:
    /// 1. `[providers.routing]` entry for the model id
    /// 2. The configured default endpoint
    /// 3. The sole endpoint, when exactly one is configured
    fn resolve(&self, model: &ModelId) -> Result<&ProviderEndpoint, InvokeError> {
        if let Some(name) = self.routing.get(model.as_str()) {
            if let Some(endpoint) = self.endpoints.get(name) {
                return Ok(endpoint);
            }
        }

        if let Some(endpoint) = self.default_endpoint() {
            return Ok(endpoint);
        }

        if self.endpoints.len() == 1 {
            if let Some(endpoint) = self.endpoints.values().next() {
                return Ok(endpoint);
            }
        }

        Err(InvokeError::InvalidModel(format!(
            "no endpoint configured for model {}",
            model
        )))
    }
}

#[async_trait]
impl ModelInvoker for HttpModelInvoker {
    async fn invoke(
        &self,
        model: &ModelId,
        prompt: &str,
        temperature: Option<f64>,
    ) -> Result<String, InvokeError> {
        let endpoint = self.resolve(model)?;
        debug!(
            "Invoking model {} via endpoint {} ({})",
            model, endpoint.name, endpoint.base_url
        );

        let mut body = json!({
            "model": model.as_str(),
            "messages": [{ "role": "user", "content": prompt }],
        });
        if let Some(temperature) = temperature {
            body["temperature"] = json!(temperature);
        }

        let url = format!(
            "{}/chat/completions",
            endpoint.base_url.trim_end_matches('/')
        );
        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &endpoint.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(map_transport_error)?;

        if !(200..300).contains(&status) {
            return Err(classify_status(status, &text, model));
        }

        extract_completion(&text)
            .ok_or_else(|| InvokeError::Other(format!("malformed completion response from {}", url)))
    }
}

fn map_transport_error(error: reqwest::Error) -> InvokeError {
    if error.is_timeout() {
        InvokeError::Timeout
    } else {
        InvokeError::Connection(error.to_string())
    }
}

/// Map a non-2xx status to the invoker error taxonomy
fn classify_status(status: u16, body: &str, model: &ModelId) -> InvokeError {
    let message = truncate_str(body.trim(), 200).to_string();
    match status {
        429 => InvokeError::RateLimited,
        404 => InvokeError::InvalidModel(model.to_string()),
        _ => InvokeError::Api { status, message },
    }
}

/// Pull the first choice's message content out of a completion response
fn extract_completion(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(name: &str) -> ProviderEndpoint {
        ProviderEndpoint {
            name: name.to_string(),
            base_url: format!("http://{}.example/v1", name),
            api_key: None,
        }
    }

    // ==================== resolve routing priority ====================

    #[test]
    fn test_explicit_routing_takes_priority() {
        let invoker = HttpModelInvoker::new(
            vec![endpoint("local"), endpoint("openai")],
            HashMap::from([("gpt-4o".to_string(), "openai".to_string())]),
            Some("local".to_string()),
        );
        let resolved = invoker.resolve(&ModelId::new("gpt-4o")).unwrap();
        assert_eq!(resolved.name, "openai");
    }

    #[test]
    fn test_unrouted_model_falls_back_to_default() {
        let invoker = HttpModelInvoker::new(
            vec![endpoint("local"), endpoint("openai")],
            HashMap::new(),
            Some("local".to_string()),
        );
        let resolved = invoker.resolve(&ModelId::new("mistral")).unwrap();
        assert_eq!(resolved.name, "local");
    }

    #[test]
    fn test_single_endpoint_serves_everything() {
        let invoker = HttpModelInvoker::new(vec![endpoint("local")], HashMap::new(), None);
        let resolved = invoker.resolve(&ModelId::new("anything")).unwrap();
        assert_eq!(resolved.name, "local");
    }

    #[test]
    fn test_no_endpoint_is_an_invalid_model_error() {
        let invoker = HttpModelInvoker::new(vec![], HashMap::new(), None);
        let err = invoker.resolve(&ModelId::new("mistral")).unwrap_err();
        assert!(matches!(err, InvokeError::InvalidModel(_)));
    }

    #[test]
    fn test_routing_to_missing_endpoint_falls_back() {
        let invoker = HttpModelInvoker::new(
            vec![endpoint("local")],
            HashMap::from([("gpt-4o".to_string(), "nonexistent".to_string())]),
            Some("local".to_string()),
        );
        let resolved = invoker.resolve(&ModelId::new("gpt-4o")).unwrap();
        assert_eq!(resolved.name, "local");
    }

    // ==================== error classification ====================

    #[test]
    fn test_classify_status() {
        let model = ModelId::new("m");
        assert!(matches!(
            classify_status(429, "slow down", &model),
            InvokeError::RateLimited
        ));
        assert!(matches!(
            classify_status(404, "no such model", &model),
            InvokeError::InvalidModel(_)
        ));
        let err = classify_status(503, "overloaded", &model);
        assert!(matches!(err, InvokeError::Api { status: 503, .. }));
        assert!(err.is_transient());
        let err = classify_status(400, "bad request", &model);
        assert!(matches!(err, InvokeError::Api { status: 400, .. }));
        assert!(!err.is_transient());
    }

    // ==================== response extraction ====================

    #[test]
    fn test_extract_completion() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"hi"}}]}"#;
        assert_eq!(extract_completion(body), Some("hi".to_string()));
    }

    #[test]
    fn test_extract_completion_malformed() {
        assert_eq!(extract_completion("{}"), None);
        assert_eq!(extract_completion("not json"), None);
    }
}
