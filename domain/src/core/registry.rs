//! Model registry — lookup of known models and their capability flags.
//!
//! Command validation checks every requested model id against a registry,
//! and the dispatcher consults it to decide whether a model accepts a
//! sampling temperature. The trait keeps reads synchronous so the parser
//! stays a pure function; implementations that need to fetch a catalog
//! (see the infrastructure layer) refresh out of band and serve a snapshot.

use super::model_id::ModelId;
use serde::{Deserialize, Serialize};

/// Metadata for one registered model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// The model identifier
    pub id: ModelId,
    /// Whether the backend accepts a sampling temperature
    pub supports_temperature: bool,
    /// Optional provider/endpoint name used for routing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl ModelInfo {
    pub fn new(id: impl Into<ModelId>) -> Self {
        Self {
            id: id.into(),
            supports_temperature: true,
            provider: None,
        }
    }

    pub fn without_temperature(mut self) -> Self {
        self.supports_temperature = false;
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }
}

/// Lookup of known models
///
/// Implementations must answer from local state — no I/O on the read path.
pub trait ModelRegistry: Send + Sync {
    /// Whether the given id names a known model
    fn contains(&self, id: &ModelId) -> bool;

    /// Whether the given model accepts a sampling temperature.
    ///
    /// Unknown models report `false`.
    fn supports_temperature(&self, id: &ModelId) -> bool;

    /// Snapshot of all registered models
    fn models(&self) -> Vec<ModelInfo>;
}

/// Table-backed registry
#[derive(Debug, Clone, Default)]
pub struct StaticModelRegistry {
    entries: Vec<ModelInfo>,
}

impl StaticModelRegistry {
    pub fn new(entries: Vec<ModelInfo>) -> Self {
        Self { entries }
    }

    /// Registry where every listed id supports temperature — the common
    /// case in tests.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ModelId>,
    {
        Self {
            entries: ids.into_iter().map(|id| ModelInfo::new(id)).collect(),
        }
    }

    fn find(&self, id: &ModelId) -> Option<&ModelInfo> {
        self.entries.iter().find(|e| &e.id == id)
    }
}

impl ModelRegistry for StaticModelRegistry {
    fn contains(&self, id: &ModelId) -> bool {
        self.find(id).is_some()
    }

    fn supports_temperature(&self, id: &ModelId) -> bool {
        self.find(id).map(|e| e.supports_temperature).unwrap_or(false)
    }

    fn models(&self) -> Vec<ModelInfo> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains() {
        let registry = StaticModelRegistry::from_ids(["mistral", "llama"]);
        assert!(registry.contains(&ModelId::new("mistral")));
        assert!(!registry.contains(&ModelId::new("gpt-x")));
    }

    #[test]
    fn test_supports_temperature_flag() {
        let registry = StaticModelRegistry::new(vec![
            ModelInfo::new("mistral"),
            ModelInfo::new("stable-code").without_temperature(),
        ]);
        assert!(registry.supports_temperature(&ModelId::new("mistral")));
        assert!(!registry.supports_temperature(&ModelId::new("stable-code")));
    }

    #[test]
    fn test_unknown_model_reports_no_temperature() {
        let registry = StaticModelRegistry::from_ids(["mistral"]);
        assert!(!registry.supports_temperature(&ModelId::new("unknown")));
    }

    #[test]
    fn test_models_snapshot() {
        let registry =
            StaticModelRegistry::new(vec![ModelInfo::new("a").with_provider("default")]);
        let models = registry.models();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].provider.as_deref(), Some("default"));
    }
}
