//! Domain layer for flare
//!
//! This crate contains the core business logic of the FLARE command
//! language: the grammar parser, the command and candidate value objects,
//! the closed operation enumeration, prompt templates for synthesis calls,
//! and judge-verdict parsing. It has no dependencies on infrastructure or
//! presentation concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## FLARE command
//!
//! A bracketed DSL text describing which models to query, optional sampling
//! parameters, an ordered chain of post-processing operations, and a prompt:
//!
//! ```text
//! { flare model:mistral,llama temp:0.7 vote `Say hi` }
//! ```
//!
//! ## Candidates
//!
//! Each queried model produces one [`CandidateResponse`]; the ordered
//! working set at any pipeline stage is a [`CandidateSet`]. Sets are never
//! mutated in place — every stage constructs a fresh one.

pub mod candidate;
pub mod command;
pub mod core;
pub mod prompt;
pub mod util;
pub mod verdict;

// Re-export commonly used types
pub use candidate::{CandidateResponse, CandidateSet};
pub use command::{
    entities::Command,
    grammar::{CommandError, ParseError, ValidationError, parse},
    operation::OperationKind,
};
pub use core::{
    model_id::ModelId,
    registry::{ModelInfo, ModelRegistry, StaticModelRegistry},
};
pub use prompt::ReducePrompt;
pub use verdict::{parse_choice, parse_selection};
