//! Prompt templates for reduction synthesis calls

pub mod template;

pub use template::ReducePrompt;
