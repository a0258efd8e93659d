//! Core domain concepts shared across all subdomains.
//!
//! - [`model_id::ModelId`] — identifier of an LLM backend
//! - [`registry::ModelRegistry`] — lookup of known models and their
//!   capability flags

pub mod model_id;
pub mod registry;
