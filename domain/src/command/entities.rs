//! Command entity - the validated form of a FLARE request.

use crate::command::operation::OperationKind;
use crate::core::model_id::ModelId;
use serde::{Deserialize, Serialize};

/// A parsed, validated FLARE command (immutable)
///
/// Only [`grammar::parse`](crate::command::grammar::parse) constructs one;
/// a `Command` in hand therefore always satisfies the invariants:
///
/// - `models` is non-empty and duplicate-free (first occurrence wins)
/// - `temperature`, if present, lies in `[0.0, 2.0]`
/// - every operation is a member of the closed [`OperationKind`] set
/// - `prompt` is non-empty after trimming
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    models: Vec<ModelId>,
    temperature: Option<f64>,
    operations: Vec<OperationKind>,
    prompt: String,
}

impl Command {
    pub(crate) fn new(
        models: Vec<ModelId>,
        temperature: Option<f64>,
        operations: Vec<OperationKind>,
        prompt: String,
    ) -> Self {
        debug_assert!(!models.is_empty());
        debug_assert!(!prompt.trim().is_empty());
        Self {
            models,
            temperature,
            operations,
            prompt,
        }
    }

    /// Models to dispatch to, in request order
    pub fn models(&self) -> &[ModelId] {
        &self.models
    }

    /// Optional sampling temperature, within `[0.0, 2.0]`
    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    /// Post-processing operations, in execution order
    pub fn operations(&self) -> &[OperationKind] {
        &self.operations
    }

    /// The trimmed prompt text
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}
