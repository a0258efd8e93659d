//! Candidate value objects - immutable working set of model answers.
//!
//! A [`CandidateResponse`] is one model's answer to the prompt, tagged with
//! its source model id. A [`CandidateSet`] is the ordered working set at a
//! given pipeline stage: dispatch produces the initial set in `models`
//! order, and every reduction operation replaces it with a freshly
//! constructed one. Sets are never edited in place, so each stage's output
//! is an independent, inspectable snapshot.

use crate::core::model_id::ModelId;
use serde::{Deserialize, Serialize};

/// One model's answer to the prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateResponse {
    /// The model that produced this answer
    pub model: ModelId,
    /// The answer text
    pub text: String,
}

impl CandidateResponse {
    pub fn new(model: impl Into<ModelId>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            text: text.into(),
        }
    }
}

/// Ordered sequence of candidate responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSet(Vec<CandidateResponse>);

impl CandidateSet {
    pub fn new(candidates: Vec<CandidateResponse>) -> Self {
        Self(candidates)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateResponse> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&CandidateResponse> {
        self.0.get(index)
    }

    pub fn first(&self) -> Option<&CandidateResponse> {
        self.0.first()
    }

    pub fn into_inner(self) -> Vec<CandidateResponse> {
        self.0
    }

    /// Provenance labels of all candidates, in set order
    pub fn model_ids(&self) -> Vec<ModelId> {
        self.0.iter().map(|c| c.model.clone()).collect()
    }

    /// `(label, text)` pairs for synthesis prompts: "Response A", "Response B", ...
    pub fn labeled(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .enumerate()
            .map(|(i, c)| (label(i), c.text.clone()))
            .collect()
    }
}

impl From<Vec<CandidateResponse>> for CandidateSet {
    fn from(candidates: Vec<CandidateResponse>) -> Self {
        Self::new(candidates)
    }
}

/// Anonymous label for the candidate at `index`: A, B, ... Z, then numeric.
pub fn label(index: usize) -> String {
    if index < 26 {
        format!("Response {}", (b'A' + index as u8) as char)
    } else {
        format!("Response {}", index + 1)
    }
}
