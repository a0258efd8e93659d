//! Application layer for flare
//!
//! This crate contains use cases, port definitions, and application
//! configuration. It depends only on the domain layer.
//!
//! The request flow is a straight pipeline:
//!
//! ```text
//! text -> parse (domain) -> Dispatcher -> ReductionPipeline -> final text
//! ```
//!
//! [`ProcessCommandUseCase`] is the top-level entry point; the surrounding
//! system supplies a [`ModelInvoker`] adapter and a model registry.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{Deadline, DispatchParams};
pub use ports::model_invoker::{InvokeError, ModelInvoker};
pub use use_cases::dispatch::{DispatchError, DispatchOutcome, Dispatcher, ModelFailure};
pub use use_cases::process_command::{FlareOutcome, ProcessCommandUseCase, ProcessError};
pub use use_cases::reduce::{PostProcessError, ReductionPipeline};
