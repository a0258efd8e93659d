//! FLARE grammar parser.
//!
//! Turns raw command text into a validated [`Command`]. The envelope is
//!
//! ```text
//! { flare [model:<id>[,<id>...]] [temp:<float>] [<op> ...] `<prompt>` }
//! ```
//!
//! Malformed envelope syntax fails with [`ParseError`]; syntactically
//! well-formed but semantically invalid input fails with
//! [`ValidationError`]. Parsing is a pure function — identical input
//! always yields an identical `Command` or an identical error, and no I/O
//! or retry is involved.

use crate::command::entities::Command;
use crate::command::operation::OperationKind;
use crate::core::model_id::ModelId;
use crate::core::registry::ModelRegistry;
use thiserror::Error;

/// Inclusive sampling temperature bounds
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=2.0;

/// Malformed envelope syntax
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Invalid FLARE command syntax")]
    InvalidEnvelope,

    #[error("Missing prompt: expected a backtick-delimited segment")]
    MissingPrompt,

    #[error("Unterminated prompt: missing closing backtick")]
    UnterminatedPrompt,

    #[error("Multiple prompt segments are not supported")]
    MultiplePrompts,

    #[error("Unexpected content after the prompt segment")]
    TrailingContent,
}

/// Well-formed but semantically invalid input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("No models specified")]
    EmptyModelList,

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Invalid temperature value: {0}")]
    InvalidTemperature(String),

    #[error("Temperature {0} out of range (expected 0.0 to 2.0)")]
    TemperatureOutOfRange(f64),

    #[error("Unknown operation or attribute: {0}")]
    UnknownToken(String),

    #[error("Prompt is empty")]
    EmptyPrompt,
}

/// Any way a command can fail to parse
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Parse raw command text into a validated [`Command`].
///
/// Requested model ids are checked against `registry`; an id the registry
/// does not know is a [`ValidationError::UnknownModel`].
pub fn parse(raw: &str, registry: &dyn ModelRegistry) -> Result<Command, CommandError> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or(ParseError::InvalidEnvelope)?;

    // The envelope must open with the literal keyword, before any prompt
    // delimiter is even considered
    let rest = inner
        .trim_start()
        .strip_prefix("flare")
        .filter(|r| r.is_empty() || r.starts_with(char::is_whitespace) || r.starts_with('`'))
        .ok_or(ParseError::InvalidEnvelope)?;

    let (head, prompt) = split_prompt(rest)?;

    let tokens = head.split_whitespace();

    let mut models: Vec<ModelId> = Vec::new();
    let mut temperature_raw: Option<&str> = None;
    let mut operations: Vec<OperationKind> = Vec::new();

    for token in tokens {
        if let Some((key, value)) = token.split_once(':') {
            match key {
                "model" => {
                    for id in value.split(',').filter_map(ModelId::try_new) {
                        // Duplicates collapse, first occurrence wins
                        if !models.contains(&id) {
                            models.push(id);
                        }
                    }
                }
                "temp" => temperature_raw = Some(value),
                // Unrecognized attribute keys are ignored (forward compatibility)
                _ => {}
            }
        } else if let Some(op) = OperationKind::parse_token(token) {
            operations.push(op);
        } else if token == "model" || token == "temp" {
            // A recognized attribute key with no value contributes nothing
        } else {
            return Err(ValidationError::UnknownToken(token.to_string()).into());
        }
    }

    // Semantic validation, in a fixed order for deterministic errors
    if models.is_empty() {
        return Err(ValidationError::EmptyModelList.into());
    }

    let temperature = match temperature_raw {
        None => None,
        Some(raw) => {
            let value: f64 = raw
                .parse()
                .map_err(|_| ValidationError::InvalidTemperature(raw.to_string()))?;
            if !TEMPERATURE_RANGE.contains(&value) {
                return Err(ValidationError::TemperatureOutOfRange(value).into());
            }
            Some(value)
        }
    };

    for model in &models {
        if !registry.contains(model) {
            return Err(ValidationError::UnknownModel(model.to_string()).into());
        }
    }

    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(ValidationError::EmptyPrompt.into());
    }

    Ok(Command::new(
        models,
        temperature,
        operations,
        prompt.to_string(),
    ))
}

/// Split envelope contents into the attribute/operation head and the
/// prompt between exactly one pair of backticks. Nested backticks are not
/// supported.
fn split_prompt(inner: &str) -> Result<(&str, &str), ParseError> {
    let parts: Vec<&str> = inner.split('`').collect();
    match parts.len() {
        1 => Err(ParseError::MissingPrompt),
        2 => Err(ParseError::UnterminatedPrompt),
        3 => {
            if !parts[2].trim().is_empty() {
                return Err(ParseError::TrailingContent);
            }
            Ok((parts[0], parts[1]))
        }
        _ => Err(ParseError::MultiplePrompts),
    }
}
