//! Model identifier value object

use serde::{Deserialize, Serialize};

/// Identifier of an LLM backend (Value Object)
///
/// FLARE commands name models by free-form identifiers (`mistral`,
/// `claude-sonnet-4.5`, ...); whether an identifier is actually usable is
/// decided against a [`ModelRegistry`](super::registry::ModelRegistry),
/// not baked into a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    /// Create a new model id.
    ///
    /// # Panics
    /// Panics if the id is empty or only whitespace.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        assert!(!id.trim().is_empty(), "Model id cannot be empty");
        Self(id.trim().to_string())
    }

    /// Try to create a model id, returning None if empty after trimming.
    pub fn try_new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Get the string form of this id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        ModelId::new(s)
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        ModelId::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id_creation() {
        let id = ModelId::new("mistral");
        assert_eq!(id.as_str(), "mistral");
    }

    #[test]
    fn test_model_id_trims() {
        let id = ModelId::new("  mistral  ");
        assert_eq!(id.as_str(), "mistral");
    }

    #[test]
    #[should_panic]
    fn test_empty_model_id_panics() {
        ModelId::new("   ");
    }

    #[test]
    fn test_try_new() {
        assert!(ModelId::try_new("").is_none());
        assert!(ModelId::try_new("  ").is_none());
        assert_eq!(
            ModelId::try_new("llama").map(|m| m.as_str().to_string()),
            Some("llama".to_string())
        );
    }
}
