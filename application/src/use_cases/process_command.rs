//! Process Command use case.
//!
//! The top-level entry point: raw FLARE text in, final answer text out.
//! Composes the domain parser, the [`Dispatcher`] and the
//! [`ReductionPipeline`], and translates every internal failure into the
//! surfaced [`ProcessError`] taxonomy with the originating cause
//! preserved.

use crate::config::{Deadline, DispatchParams};
use crate::ports::model_invoker::ModelInvoker;
use crate::use_cases::dispatch::{DispatchError, Dispatcher};
use crate::use_cases::reduce::{PostProcessError, ReductionPipeline};
use flare_domain::command::grammar::{CommandError, ParseError, ValidationError, parse};
use flare_domain::util::truncate_str;
use flare_domain::{ModelId, ModelRegistry};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors surfaced to the caller, one kind per failure class
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Post-process error: {0}")]
    PostProcess(#[from] PostProcessError),

    #[error("Deadline exceeded during {stage}")]
    Timeout { stage: String },
}

impl From<CommandError> for ProcessError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Parse(e) => ProcessError::Parse(e),
            CommandError::Validation(e) => ProcessError::Validation(e),
        }
    }
}

impl ProcessError {
    /// Machine-readable failure kind, for transport-level mapping
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessError::Parse(_) => "parse",
            ProcessError::Validation(_) => "validation",
            ProcessError::Dispatch(_) => "dispatch",
            ProcessError::PostProcess(_) => "post_process",
            ProcessError::Timeout { .. } => "timeout",
        }
    }
}

/// Result of a processed command
#[derive(Debug, Clone)]
pub struct FlareOutcome {
    /// The final answer text
    pub text: String,
    /// Warning notes for models dropped during dispatch (partial success)
    pub warnings: Vec<String>,
}

/// Use case for processing one FLARE command end to end
pub struct ProcessCommandUseCase {
    registry: Arc<dyn ModelRegistry>,
    dispatcher: Dispatcher,
    pipeline: ReductionPipeline,
    overall_timeout: Option<Duration>,
}

impl ProcessCommandUseCase {
    pub fn new(invoker: Arc<dyn ModelInvoker>, registry: Arc<dyn ModelRegistry>) -> Self {
        Self {
            dispatcher: Dispatcher::new(Arc::clone(&invoker), Arc::clone(&registry)),
            pipeline: ReductionPipeline::new(invoker),
            registry,
            overall_timeout: None,
        }
    }

    /// Bound the whole request by one overall deadline
    pub fn with_overall_timeout(mut self, timeout: Duration) -> Self {
        self.overall_timeout = Some(timeout);
        self
    }

    pub fn with_dispatch_params(mut self, params: DispatchParams) -> Self {
        self.dispatcher = self.dispatcher.with_params(params);
        self
    }

    /// Route reduction synthesis calls to a fixed model
    pub fn with_synthesis_model(mut self, model: ModelId) -> Self {
        self.pipeline = self.pipeline.with_synthesis_model(model);
        self
    }

    /// Parse, dispatch, reduce, and select the final answer.
    pub async fn execute(&self, raw: &str) -> Result<FlareOutcome, ProcessError> {
        let deadline = match self.overall_timeout {
            Some(budget) => Deadline::within(budget),
            None => Deadline::unbounded(),
        };

        let command = parse(raw, self.registry.as_ref())?;
        info!(
            "Processing FLARE command: {} models, {} operations, prompt: {}",
            command.models().len(),
            command.operations().len(),
            truncate_str(command.prompt(), 80)
        );

        let dispatched = match self.dispatcher.dispatch(&command, &deadline).await {
            Ok(outcome) => outcome,
            Err(e) if deadline.is_elapsed() => {
                debug!("Dispatch failed at the overall deadline: {}", e);
                return Err(ProcessError::Timeout {
                    stage: "dispatch".to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let warnings: Vec<String> = dispatched.failures.iter().map(|f| f.to_string()).collect();
        for warning in &warnings {
            warn!("{}", warning);
        }

        let final_set = match self
            .pipeline
            .reduce(
                command.prompt(),
                dispatched.candidates,
                command.operations(),
                &deadline,
            )
            .await
        {
            Ok(set) => set,
            Err(e) if deadline.is_elapsed() => {
                debug!("Pipeline failed at the overall deadline: {}", e);
                return Err(ProcessError::Timeout {
                    stage: format!("operation {}", e.operation()),
                });
            }
            Err(e) => return Err(e.into()),
        };

        // Final selection policy: with no reducing operation several
        // candidates may remain; the first in set order wins and the rest
        // are discarded.
        if final_set.len() > 1 {
            debug!(
                "{} candidates remain; returning the first in set order",
                final_set.len()
            );
        }

        let text = final_set
            .first()
            .map(|c| c.text.clone())
            .unwrap_or_default();

        Ok(FlareOutcome { text, warnings })
    }
}
