//! Reduction pipeline.
//!
//! Applies a command's post-processing operations strictly in order: the
//! output of operation *i* is the sole input of operation *i+1*. The
//! sequential, data-dependent chaining is intentional — vote or summarize
//! must see the fully materialized output of the previous stage. Each
//! stage constructs a fresh [`CandidateSet`]; nothing is mutated in place.
//!
//! Operations that synthesize (summarize, vote, difference, expand,
//! filter) issue calls through the same [`ModelInvoker`] the dispatcher
//! used, addressed to the synthesis model: the configured override when
//! set, otherwise the first model in the current set's provenance.
//! Combine is a pure text transform and never touches the invoker.

use crate::config::Deadline;
use crate::ports::model_invoker::{InvokeError, ModelInvoker};
use flare_domain::{
    CandidateResponse, CandidateSet, ModelId, OperationKind, ReducePrompt, verdict,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Separator between candidate texts in a combine output
const COMBINE_SEPARATOR: &str = "\n\n---\n\n";

/// Errors that can occur while reducing the candidate set
#[derive(Error, Debug)]
pub enum PostProcessError {
    #[error("operation {operation} requires multiple candidate responses, got {got}")]
    NotEnoughCandidates {
        operation: OperationKind,
        got: usize,
    },

    #[error("operation {operation} synthesis call failed: {source}")]
    SynthesisFailed {
        operation: OperationKind,
        #[source]
        source: InvokeError,
    },
}

impl PostProcessError {
    /// The operation that was active when the pipeline failed
    pub fn operation(&self) -> OperationKind {
        match self {
            PostProcessError::NotEnoughCandidates { operation, .. }
            | PostProcessError::SynthesisFailed { operation, .. } => *operation,
        }
    }
}

/// Sequential fold of post-processing operations over a candidate set
pub struct ReductionPipeline {
    invoker: Arc<dyn ModelInvoker>,
    synthesis_model: Option<ModelId>,
    call_timeout: Duration,
}

impl ReductionPipeline {
    pub fn new(invoker: Arc<dyn ModelInvoker>) -> Self {
        Self {
            invoker,
            synthesis_model: None,
            call_timeout: Duration::from_secs(30),
        }
    }

    /// Route all synthesis calls to a fixed model instead of the first
    /// model in the current set's provenance.
    pub fn with_synthesis_model(mut self, model: ModelId) -> Self {
        self.synthesis_model = Some(model);
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Apply `operations` in order to `initial`, returning the final set.
    ///
    /// `question` is the command's original prompt; synthesis prompts show
    /// it to the model for context.
    pub async fn reduce(
        &self,
        question: &str,
        initial: CandidateSet,
        operations: &[OperationKind],
        deadline: &Deadline,
    ) -> Result<CandidateSet, PostProcessError> {
        let mut current = initial;

        for &op in operations {
            // Cardinality precondition, checked before any model call
            if current.is_empty() || (op.requires_multiple() && current.len() < 2) {
                return Err(PostProcessError::NotEnoughCandidates {
                    operation: op,
                    got: current.len(),
                });
            }

            debug!("Applying {} to {} candidates", op, current.len());
            current = self.apply(op, question, current, deadline).await?;
        }

        Ok(current)
    }

    async fn apply(
        &self,
        op: OperationKind,
        question: &str,
        current: CandidateSet,
        deadline: &Deadline,
    ) -> Result<CandidateSet, PostProcessError> {
        match op {
            OperationKind::Summarize => self.summarize(question, current, deadline).await,
            OperationKind::Vote => self.vote(question, current, deadline).await,
            OperationKind::Combine => Ok(combine(current)),
            OperationKind::Difference => self.difference(question, current, deadline).await,
            OperationKind::Expand => self.expand(question, current, deadline).await,
            OperationKind::Filter => self.filter(question, current, deadline).await,
        }
    }

    /// Model all synthesis calls go to for the given working set
    fn synthesis_target(&self, set: &CandidateSet) -> ModelId {
        self.synthesis_model
            .clone()
            .or_else(|| set.first().map(|c| c.model.clone()))
            .unwrap_or_else(|| ModelId::new("synthesis"))
    }

    /// One bounded invoker call on behalf of `op`
    async fn call(
        &self,
        op: OperationKind,
        model: &ModelId,
        system: &str,
        prompt: String,
        deadline: &Deadline,
    ) -> Result<String, PostProcessError> {
        let full = format!("{}\n\n{}", system, prompt);
        let budget = deadline.clamp(self.call_timeout);
        match timeout(budget, self.invoker.invoke(model, &full, None)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(PostProcessError::SynthesisFailed {
                operation: op,
                source: e,
            }),
            Err(_) => Err(PostProcessError::SynthesisFailed {
                operation: op,
                source: InvokeError::Timeout,
            }),
        }
    }

    /// Synthesize all candidates into one. A single-entry set passes
    /// through untouched.
    async fn summarize(
        &self,
        question: &str,
        current: CandidateSet,
        deadline: &Deadline,
    ) -> Result<CandidateSet, PostProcessError> {
        if current.len() == 1 {
            return Ok(current);
        }

        let target = self.synthesis_target(&current);
        let text = self
            .call(
                OperationKind::Summarize,
                &target,
                ReducePrompt::summarize_system(),
                ReducePrompt::summarize_prompt(question, &current.labeled()),
                deadline,
            )
            .await?;

        Ok(CandidateSet::new(vec![CandidateResponse::new(target, text)]))
    }

    /// Judge call selecting exactly one existing entry. An unparseable
    /// verdict deterministically falls back to the first entry in the
    /// current order.
    async fn vote(
        &self,
        question: &str,
        current: CandidateSet,
        deadline: &Deadline,
    ) -> Result<CandidateSet, PostProcessError> {
        let target = self.synthesis_target(&current);
        let reply = self
            .call(
                OperationKind::Vote,
                &target,
                ReducePrompt::vote_system(),
                ReducePrompt::vote_prompt(question, &current.labeled()),
                deadline,
            )
            .await?;

        let index = match verdict::parse_choice(&reply, current.len()) {
            Some(index) => index,
            None => {
                warn!("Vote verdict named no candidate; keeping the first");
                0
            }
        };

        let winner = current
            .get(index)
            .or_else(|| current.first())
            .cloned()
            .expect("vote input is non-empty");
        Ok(CandidateSet::new(vec![winner]))
    }

    /// Comparison synthesis over all entries
    async fn difference(
        &self,
        question: &str,
        current: CandidateSet,
        deadline: &Deadline,
    ) -> Result<CandidateSet, PostProcessError> {
        let target = self.synthesis_target(&current);
        let text = self
            .call(
                OperationKind::Difference,
                &target,
                ReducePrompt::difference_system(),
                ReducePrompt::difference_prompt(question, &current.labeled()),
                deadline,
            )
            .await?;

        Ok(CandidateSet::new(vec![CandidateResponse::new(target, text)]))
    }

    /// Per-entry elaboration; the calls run concurrently and the output
    /// set keeps the input's size and order.
    async fn expand(
        &self,
        question: &str,
        current: CandidateSet,
        deadline: &Deadline,
    ) -> Result<CandidateSet, PostProcessError> {
        let target = self.synthesis_target(&current);

        let calls = current.iter().map(|candidate| {
            let prompt = ReducePrompt::expand_prompt(question, &candidate.text);
            self.call(OperationKind::Expand, &target, ReducePrompt::expand_system(), prompt, deadline)
        });

        let results = futures::future::join_all(calls).await;

        let mut expanded = Vec::with_capacity(current.len());
        for (candidate, result) in current.iter().zip(results) {
            expanded.push(CandidateResponse::new(candidate.model.clone(), result?));
        }
        Ok(CandidateSet::new(expanded))
    }

    /// Judge call keeping a quality subset; a verdict that would drop
    /// everything retains the first entry instead.
    async fn filter(
        &self,
        question: &str,
        current: CandidateSet,
        deadline: &Deadline,
    ) -> Result<CandidateSet, PostProcessError> {
        let target = self.synthesis_target(&current);
        let reply = self
            .call(
                OperationKind::Filter,
                &target,
                ReducePrompt::filter_system(),
                ReducePrompt::filter_prompt(question, &current.labeled()),
                deadline,
            )
            .await?;

        let mut keep = verdict::parse_selection(&reply, current.len());
        if keep.is_empty() {
            warn!("Filter verdict kept nothing; retaining the first candidate");
            keep.push(0);
        }

        let kept: Vec<CandidateResponse> = keep
            .into_iter()
            .filter_map(|i| current.get(i).cloned())
            .collect();
        Ok(CandidateSet::new(kept))
    }
}

/// Pure text transform: join all candidate texts with a visible
/// separator, preserving input order. Provenance is the joined model ids.
fn combine(current: CandidateSet) -> CandidateSet {
    let joined_id = current
        .model_ids()
        .iter()
        .map(|m| m.as_str().to_string())
        .collect::<Vec<_>>()
        .join("+");

    let text = current
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(COMBINE_SEPARATOR);

    CandidateSet::new(vec![CandidateResponse::new(joined_id, text)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // ==================== Test Mocks ====================

    /// Returns a scripted reply for every call, recording the prompts seen.
    struct ScriptedInvoker {
        replies: Mutex<Vec<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedInvoker {
        fn new(replies: Vec<&str>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into_iter().rev().map(String::from).collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl ModelInvoker for ScriptedInvoker {
        async fn invoke(
            &self,
            _model: &ModelId,
            prompt: &str,
            _temperature: Option<f64>,
        ) -> Result<String, InvokeError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| InvokeError::Other("no scripted reply".to_string()))
        }
    }

    /// Echoes the prompt back, for per-entry operations where reply order
    /// must track the calling entry.
    struct EchoInvoker;

    #[async_trait::async_trait]
    impl ModelInvoker for EchoInvoker {
        async fn invoke(
            &self,
            _model: &ModelId,
            prompt: &str,
            _temperature: Option<f64>,
        ) -> Result<String, InvokeError> {
            Ok(format!("expanded: {}", prompt))
        }
    }

    fn set(entries: &[(&str, &str)]) -> CandidateSet {
        CandidateSet::new(
            entries
                .iter()
                .map(|(model, text)| CandidateResponse::new(*model, *text))
                .collect(),
        )
    }

    fn single() -> CandidateSet {
        set(&[("a", "only answer")])
    }

    fn pair() -> CandidateSet {
        set(&[("a", "foo"), ("b", "bar")])
    }

    // ==================== Cardinality preconditions ====================

    #[tokio::test]
    async fn test_multi_input_operations_reject_single_candidate() {
        for op in [
            OperationKind::Vote,
            OperationKind::Combine,
            OperationKind::Difference,
            OperationKind::Filter,
        ] {
            let invoker = ScriptedInvoker::new(vec![]);
            let pipeline = ReductionPipeline::new(Arc::clone(&invoker) as Arc<dyn ModelInvoker>);

            let err = pipeline
                .reduce("q", single(), &[op], &Deadline::unbounded())
                .await
                .unwrap_err();

            assert!(matches!(
                err,
                PostProcessError::NotEnoughCandidates { operation, got: 1 } if operation == op
            ));
            // The precondition fires before any model call
            assert_eq!(invoker.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_summarize_single_candidate_passes_through() {
        let invoker = ScriptedInvoker::new(vec![]);
        let pipeline = ReductionPipeline::new(Arc::clone(&invoker) as Arc<dyn ModelInvoker>);

        let result = pipeline
            .reduce("q", single(), &[OperationKind::Summarize], &Deadline::unbounded())
            .await
            .unwrap();

        assert_eq!(result.get(0).unwrap().text, "only answer");
        assert_eq!(invoker.call_count(), 0);
    }

    // ==================== Operation semantics ====================

    #[tokio::test]
    async fn test_summarize_synthesizes_multiple_candidates() {
        let invoker = ScriptedInvoker::new(vec!["a synthesis of foo and bar"]);
        let pipeline = ReductionPipeline::new(Arc::clone(&invoker) as Arc<dyn ModelInvoker>);

        let result = pipeline
            .reduce("q", pair(), &[OperationKind::Summarize], &Deadline::unbounded())
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.get(0).unwrap().text, "a synthesis of foo and bar");
        // Synthesis attributed to the first model's provenance
        assert_eq!(result.get(0).unwrap().model.as_str(), "a");
        assert_eq!(invoker.call_count(), 1);
    }

    #[tokio::test]
    async fn test_vote_selects_named_candidate() {
        let invoker = ScriptedInvoker::new(vec!["Response B"]);
        let pipeline = ReductionPipeline::new(invoker as Arc<dyn ModelInvoker>);

        let result = pipeline
            .reduce("q", pair(), &[OperationKind::Vote], &Deadline::unbounded())
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.get(0).unwrap().text, "bar");
        assert_eq!(result.get(0).unwrap().model.as_str(), "b");
    }

    #[tokio::test]
    async fn test_vote_unparseable_verdict_falls_back_to_first() {
        let invoker = ScriptedInvoker::new(vec!["they are all fine"]);
        let pipeline = ReductionPipeline::new(invoker as Arc<dyn ModelInvoker>);

        let result = pipeline
            .reduce("q", pair(), &[OperationKind::Vote], &Deadline::unbounded())
            .await
            .unwrap();

        assert_eq!(result.get(0).unwrap().text, "foo");
    }

    #[tokio::test]
    async fn test_combine_is_pure_and_order_preserving() {
        let invoker = ScriptedInvoker::new(vec![]);
        let pipeline = ReductionPipeline::new(Arc::clone(&invoker) as Arc<dyn ModelInvoker>);

        let result = pipeline
            .reduce("q", pair(), &[OperationKind::Combine], &Deadline::unbounded())
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        let combined = result.get(0).unwrap();
        assert_eq!(combined.model.as_str(), "a+b");
        let foo_at = combined.text.find("foo").unwrap();
        let bar_at = combined.text.find("bar").unwrap();
        assert!(foo_at < bar_at);
        assert!(combined.text.contains(COMBINE_SEPARATOR));
        assert_eq!(invoker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_difference_produces_single_comparison() {
        let invoker = ScriptedInvoker::new(vec!["foo says X, bar says Y"]);
        let pipeline = ReductionPipeline::new(Arc::clone(&invoker) as Arc<dyn ModelInvoker>);

        let result = pipeline
            .reduce("q", pair(), &[OperationKind::Difference], &Deadline::unbounded())
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.get(0).unwrap().text, "foo says X, bar says Y");
        assert_eq!(invoker.call_count(), 1);
    }

    #[tokio::test]
    async fn test_expand_keeps_size_and_order() {
        let pipeline = ReductionPipeline::new(Arc::new(EchoInvoker));

        let result = pipeline
            .reduce("q", pair(), &[OperationKind::Expand], &Deadline::unbounded())
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.get(0).unwrap().text.contains("foo"));
        assert!(result.get(1).unwrap().text.contains("bar"));
        assert_eq!(result.get(0).unwrap().model.as_str(), "a");
        assert_eq!(result.get(1).unwrap().model.as_str(), "b");
    }

    #[tokio::test]
    async fn test_expand_accepts_single_candidate() {
        let pipeline = ReductionPipeline::new(Arc::new(EchoInvoker));

        let result = pipeline
            .reduce("q", single(), &[OperationKind::Expand], &Deadline::unbounded())
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert!(result.get(0).unwrap().text.contains("only answer"));
    }

    #[tokio::test]
    async fn test_filter_keeps_named_subset() {
        let invoker = ScriptedInvoker::new(vec!["Keep Response B"]);
        let pipeline = ReductionPipeline::new(invoker as Arc<dyn ModelInvoker>);

        let result = pipeline
            .reduce("q", pair(), &[OperationKind::Filter], &Deadline::unbounded())
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.get(0).unwrap().model.as_str(), "b");
    }

    #[tokio::test]
    async fn test_filter_never_returns_empty_set() {
        let invoker = ScriptedInvoker::new(vec!["none of these are any good"]);
        let pipeline = ReductionPipeline::new(invoker as Arc<dyn ModelInvoker>);

        let result = pipeline
            .reduce("q", pair(), &[OperationKind::Filter], &Deadline::unbounded())
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.get(0).unwrap().text, "foo");
    }

    // ==================== Chaining ====================

    #[tokio::test]
    async fn test_operations_chain_sequentially() {
        // filter keeps both, then vote picks the second
        let invoker = ScriptedInvoker::new(vec!["Response A and Response B", "Response B"]);
        let pipeline = ReductionPipeline::new(invoker as Arc<dyn ModelInvoker>);

        let result = pipeline
            .reduce(
                "q",
                pair(),
                &[OperationKind::Filter, OperationKind::Vote],
                &Deadline::unbounded(),
            )
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.get(0).unwrap().text, "bar");
    }

    #[tokio::test]
    async fn test_chained_cardinality_violation_surfaces() {
        // vote reduces to one, then combine needs two
        let invoker = ScriptedInvoker::new(vec!["Response A"]);
        let pipeline = ReductionPipeline::new(invoker as Arc<dyn ModelInvoker>);

        let err = pipeline
            .reduce(
                "q",
                pair(),
                &[OperationKind::Vote, OperationKind::Combine],
                &Deadline::unbounded(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PostProcessError::NotEnoughCandidates {
                operation: OperationKind::Combine,
                got: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_synthesis_failure_is_fatal() {
        let invoker = ScriptedInvoker::new(vec![]);
        let pipeline = ReductionPipeline::new(invoker as Arc<dyn ModelInvoker>);

        let err = pipeline
            .reduce("q", pair(), &[OperationKind::Summarize], &Deadline::unbounded())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PostProcessError::SynthesisFailed {
                operation: OperationKind::Summarize,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_synthesis_model_override() {
        let invoker = ScriptedInvoker::new(vec!["merged"]);
        let pipeline = ReductionPipeline::new(Arc::clone(&invoker) as Arc<dyn ModelInvoker>)
            .with_synthesis_model(ModelId::new("judge"));

        let result = pipeline
            .reduce("q", pair(), &[OperationKind::Summarize], &Deadline::unbounded())
            .await
            .unwrap();

        assert_eq!(result.get(0).unwrap().model.as_str(), "judge");
    }
}
