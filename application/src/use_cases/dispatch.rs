//! Concurrent model fan-out.
//!
//! The dispatcher queries every model named by a command in parallel and
//! assembles the answers into the initial [`CandidateSet`]. Results are
//! reassembled in the original `models` order regardless of completion
//! order, so downstream reduction is deterministic and testable.
//!
//! Per-model failure policy: transient failures retry with exponential
//! backoff; a model that exhausts its retries is dropped from the set and
//! recorded as a [`ModelFailure`]. Only when every model fails does the
//! dispatch itself fail.

use crate::config::{Deadline, DispatchParams};
use crate::ports::model_invoker::{InvokeError, ModelInvoker};
use flare_domain::{CandidateResponse, CandidateSet, Command, ModelId, ModelRegistry};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

/// One model's terminal failure, after retries
#[derive(Debug, Clone)]
pub struct ModelFailure {
    pub model: ModelId,
    pub reason: String,
}

impl std::fmt::Display for ModelFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "model {} failed: {}", self.model, self.reason)
    }
}

/// Errors that can occur during dispatch
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("All models failed to respond: {}", format_failures(.failures))]
    AllModelsFailed { failures: Vec<ModelFailure> },
}

fn format_failures(failures: &[ModelFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result of a dispatch: the candidates that answered, plus the models
/// that were dropped along the way
#[derive(Debug)]
pub struct DispatchOutcome {
    /// Successful answers, in `command.models` order
    pub candidates: CandidateSet,
    /// Models excluded after exhausting retries
    pub failures: Vec<ModelFailure>,
}

/// Concurrent fan-out of one prompt to many models
pub struct Dispatcher {
    invoker: Arc<dyn ModelInvoker>,
    registry: Arc<dyn ModelRegistry>,
    params: DispatchParams,
}

impl Dispatcher {
    pub fn new(invoker: Arc<dyn ModelInvoker>, registry: Arc<dyn ModelRegistry>) -> Self {
        Self {
            invoker,
            registry,
            params: DispatchParams::default(),
        }
    }

    pub fn with_params(mut self, params: DispatchParams) -> Self {
        self.params = params;
        self
    }

    /// Query all of the command's models in parallel.
    ///
    /// The temperature is forwarded only to models whose registry entry
    /// reports temperature support; for the rest it is silently omitted.
    pub async fn dispatch(
        &self,
        command: &Command,
        deadline: &Deadline,
    ) -> Result<DispatchOutcome, DispatchError> {
        info!("Dispatching to {} models", command.models().len());

        let mut join_set = JoinSet::new();

        for (index, model) in command.models().iter().enumerate() {
            let invoker = Arc::clone(&self.invoker);
            let model = model.clone();
            let prompt = command.prompt().to_string();
            let temperature = command
                .temperature()
                .filter(|_| self.registry.supports_temperature(&model));
            let params = self.params.clone();
            let deadline = *deadline;

            join_set.spawn(async move {
                let result = invoke_with_retry(
                    invoker.as_ref(),
                    &model,
                    &prompt,
                    temperature,
                    &params,
                    &deadline,
                )
                .await;
                (index, model, result)
            });
        }

        // Completion order is arbitrary; index slots restore models order
        let mut slots: Vec<Option<(ModelId, Result<String, InvokeError>)>> =
            command.models().iter().map(|_| None).collect();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, model, result)) => slots[index] = Some((model, result)),
                Err(e) => warn!("Task join error: {}", e),
            }
        }

        let mut candidates = Vec::new();
        let mut failures = Vec::new();

        for slot in slots.into_iter().flatten() {
            match slot {
                (model, Ok(text)) => {
                    info!("Model {} responded successfully", model);
                    candidates.push(CandidateResponse::new(model, text));
                }
                (model, Err(e)) => {
                    warn!("Model {} dropped after retries: {}", model, e);
                    failures.push(ModelFailure {
                        model,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if candidates.is_empty() {
            return Err(DispatchError::AllModelsFailed { failures });
        }

        Ok(DispatchOutcome {
            candidates: CandidateSet::new(candidates),
            failures,
        })
    }
}

/// One model's invocation loop: attempt, classify, back off, retry.
async fn invoke_with_retry(
    invoker: &dyn ModelInvoker,
    model: &ModelId,
    prompt: &str,
    temperature: Option<f64>,
    params: &DispatchParams,
    deadline: &Deadline,
) -> Result<String, InvokeError> {
    let mut attempt: u32 = 0;

    loop {
        if attempt > 0 {
            let delay = params.backoff_delay(attempt);
            debug!(
                "Retrying model {} after {:?} (attempt {}/{})",
                model, delay, attempt, params.max_retries
            );
            sleep(delay).await;
        }

        let budget = deadline.clamp(params.per_call_timeout);
        let result = match timeout(budget, invoker.invoke(model, prompt, temperature)).await {
            Ok(result) => result,
            Err(_) => Err(InvokeError::Timeout),
        };

        match result {
            Ok(text) => return Ok(text),
            Err(e) if e.is_transient() && attempt < params.max_retries && !deadline.is_elapsed() => {
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
