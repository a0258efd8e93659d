//! Prompt templates for the reduction operations
//!
//! Every operation that needs a synthesis or judge call builds its prompt
//! here, from the original question and the labeled candidate texts. The
//! judge-facing templates (vote, filter) instruct the model to answer with
//! response labels so [`verdict`](crate::verdict) can extract a
//! deterministic decision.

/// Templates for generating synthesis prompts per operation
pub struct ReducePrompt;

impl ReducePrompt {
    /// System prompt for the summarize operation
    pub fn summarize_system() -> &'static str {
        r#"You are a moderator synthesizing multiple answers into one.
Cover the substance of every answer, merge overlapping points, and resolve
minor contradictions in favor of the better supported claim.
Be concise and factual."#
    }

    /// User prompt for summarize
    pub fn summarize_prompt(question: &str, responses: &[(String, String)]) -> String {
        let mut prompt = format!(
            r#"Original question: {}

Answers to synthesize:
"#,
            question
        );
        push_responses(&mut prompt, responses);
        prompt.push_str(
            r#"
Produce a single synthesized answer that covers the content of every
response above. Do not refer to the responses by label."#,
        );
        prompt
    }

    /// System prompt for the vote operation
    pub fn vote_system() -> &'static str {
        r#"You are a judge selecting the single best answer to a question.
Weigh accuracy, completeness, and clarity. You must pick exactly one."#
    }

    /// User prompt for vote
    pub fn vote_prompt(question: &str, responses: &[(String, String)]) -> String {
        let mut prompt = format!(
            r#"Original question: {}

Candidate answers:
"#,
            question
        );
        push_responses(&mut prompt, responses);
        prompt.push_str(
            r#"
Reply with the label of the single best answer (for example "Response B")
and nothing else."#,
        );
        prompt
    }

    /// System prompt for the difference operation
    pub fn difference_system() -> &'static str {
        r#"You are an analyst comparing multiple answers to the same question.
Identify where they agree, where they contradict each other, and what each
covers that the others do not."#
    }

    /// User prompt for difference
    pub fn difference_prompt(question: &str, responses: &[(String, String)]) -> String {
        let mut prompt = format!(
            r#"Original question: {}

Answers to compare:
"#,
            question
        );
        push_responses(&mut prompt, responses);
        prompt.push_str(
            r#"
Provide a structured comparison with these sections:

1. **Agreement**: points all answers share
2. **Contradictions**: claims that conflict, with the labels involved
3. **Unique content**: what each answer alone contributes"#,
        );
        prompt
    }

    /// System prompt for the expand operation
    pub fn expand_system() -> &'static str {
        r#"You are an expert elaborating on an answer.
Add depth: concrete examples, caveats, and relevant context.
Keep every claim of the original and do not change its conclusions."#
    }

    /// User prompt for expand, applied per candidate
    pub fn expand_prompt(question: &str, text: &str) -> String {
        format!(
            r#"Original question: {}

Answer to expand:
{}

Rewrite this answer with substantially more detail."#,
            question, text
        )
    }

    /// System prompt for the filter operation
    pub fn filter_system() -> &'static str {
        r#"You are a judge deciding which answers are worth keeping.
Discard answers that are wrong, off-topic, or strictly dominated by another.
Keep at least one."#
    }

    /// User prompt for filter
    pub fn filter_prompt(question: &str, responses: &[(String, String)]) -> String {
        let mut prompt = format!(
            r#"Original question: {}

Candidate answers:
"#,
            question
        );
        push_responses(&mut prompt, responses);
        prompt.push_str(
            r#"
Reply with the labels of the answers worth keeping (for example
"Response A, Response C") and nothing else."#,
        );
        prompt
    }
}

fn push_responses(prompt: &mut String, responses: &[(String, String)]) {
    for (label, content) in responses {
        prompt.push_str(&format!("\n--- {} ---\n{}\n", label, content));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responses() -> Vec<(String, String)> {
        vec![
            ("Response A".to_string(), "Rust is fast.".to_string()),
            ("Response B".to_string(), "Rust is safe.".to_string()),
        ]
    }

    #[test]
    fn test_summarize_prompt_contains_all_responses() {
        let prompt = ReducePrompt::summarize_prompt("What is Rust?", &responses());
        assert!(prompt.contains("What is Rust?"));
        assert!(prompt.contains("Rust is fast."));
        assert!(prompt.contains("Rust is safe."));
    }

    #[test]
    fn test_vote_prompt_labels() {
        let prompt = ReducePrompt::vote_prompt("What is Rust?", &responses());
        assert!(prompt.contains("Response A"));
        assert!(prompt.contains("Response B"));
        assert!(prompt.contains("single best"));
    }

    #[test]
    fn test_expand_prompt_is_per_candidate() {
        let prompt = ReducePrompt::expand_prompt("What is Rust?", "Rust is fast.");
        assert!(prompt.contains("Rust is fast."));
        assert!(!prompt.contains("Response A"));
    }

    #[test]
    fn test_filter_prompt_asks_for_labels() {
        let prompt = ReducePrompt::filter_prompt("What is Rust?", &responses());
        assert!(prompt.contains("worth keeping"));
    }
}
