//! Model Invoker port
//!
//! Defines the one capability the core needs from the outside world:
//! execute a prompt against a specific model backend. Implementations
//! (adapters) live in the infrastructure layer; the core assumes nothing
//! about the transport beyond this call contract.

use async_trait::async_trait;
use flare_domain::ModelId;
use thiserror::Error;

/// Errors that can occur during a model invocation
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Invocation error: {0}")]
    Other(String),
}

impl InvokeError {
    /// Whether retrying the same call can plausibly succeed.
    ///
    /// Timeouts, connection failures, rate limits, and 5xx-class API
    /// errors are transient; a bad model id or other 4xx-class errors are
    /// not.
    pub fn is_transient(&self) -> bool {
        match self {
            InvokeError::Timeout | InvokeError::Connection(_) | InvokeError::RateLimited => true,
            InvokeError::Api { status, .. } => *status >= 500,
            InvokeError::InvalidModel(_) | InvokeError::Other(_) => false,
        }
    }
}

/// Capability to execute a prompt against one model backend
///
/// The call must be independently cancellable (dropping the future aborts
/// the request) and safe to retry.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Execute `prompt` against `model`, optionally with a sampling
    /// temperature, and return the completion text.
    async fn invoke(
        &self,
        model: &ModelId,
        prompt: &str,
        temperature: Option<f64>,
    ) -> Result<String, InvokeError>;
}
