//! Post-processing operation enumeration

use serde::{Deserialize, Serialize};

/// The closed set of post-processing operations (Value Object)
///
/// Operations consume the current candidate set and produce a new one.
/// Some only make sense with at least two inputs — see
/// [`requires_multiple`](OperationKind::requires_multiple).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Synthesize all candidates into a single covering answer
    Summarize,
    /// Select the single best candidate via a judge call
    Vote,
    /// Concatenate all candidates with a visible separator (no model call)
    Combine,
    /// Produce a structured comparison of all candidates
    Difference,
    /// Elaborate each candidate with additional detail
    Expand,
    /// Keep only the candidates judged worth keeping (never all dropped)
    Filter,
}

impl OperationKind {
    /// Match a command token against the enumeration.
    ///
    /// Case-insensitive; the short forms `sum`, `comb` and `diff` are
    /// accepted alongside the full names.
    pub fn parse_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "summarize" | "sum" => Some(OperationKind::Summarize),
            "vote" => Some(OperationKind::Vote),
            "combine" | "comb" => Some(OperationKind::Combine),
            "difference" | "diff" => Some(OperationKind::Difference),
            "expand" => Some(OperationKind::Expand),
            "filter" => Some(OperationKind::Filter),
            _ => None,
        }
    }

    /// Whether this operation needs at least two input candidates
    pub fn requires_multiple(&self) -> bool {
        matches!(
            self,
            OperationKind::Vote
                | OperationKind::Combine
                | OperationKind::Difference
                | OperationKind::Filter
        )
    }

    /// Canonical name, as used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Summarize => "summarize",
            OperationKind::Vote => "vote",
            OperationKind::Combine => "combine",
            OperationKind::Difference => "difference",
            OperationKind::Expand => "expand",
            OperationKind::Filter => "filter",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
