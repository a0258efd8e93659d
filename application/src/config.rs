//! Execution parameters — dispatch retry policy and deadline budgeting.
//!
//! [`DispatchParams`] groups the static knobs of the fan-out
//! (per-call timeout, retry count, backoff base). [`Deadline`] tracks the
//! overall budget a caller granted to one command; every model invocation
//! is bounded by the lesser of the per-call timeout and the remaining
//! budget.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Fan-out control parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchParams {
    /// Upper bound for one model invocation attempt.
    pub per_call_timeout: Duration,
    /// Retries after the first attempt, for transient failures only.
    pub max_retries: u32,
    /// First retry delay; doubles per subsequent attempt.
    pub backoff_base: Duration,
}

impl Default for DispatchParams {
    fn default() -> Self {
        Self {
            per_call_timeout: Duration::from_secs(30),
            max_retries: 2,
            backoff_base: Duration::from_millis(500),
        }
    }
}

impl DispatchParams {
    // ==================== Builder Methods ====================

    pub fn with_per_call_timeout(mut self, timeout: Duration) -> Self {
        self.per_call_timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Backoff delay before retry `attempt` (1-based): base * 2^(attempt-1)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_base * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Overall time budget for one command.
///
/// Constructed once by the orchestrator and threaded through dispatch and
/// every pipeline stage. `Unbounded` means no overall limit; per-call
/// timeouts still apply.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Option<Instant>,
}

impl Deadline {
    /// No overall limit
    pub fn unbounded() -> Self {
        Self { expires_at: None }
    }

    /// Expires `budget` from now
    pub fn within(budget: Duration) -> Self {
        Self {
            expires_at: Some(Instant::now() + budget),
        }
    }

    /// Remaining budget; `None` when unbounded
    pub fn remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    pub fn is_elapsed(&self) -> bool {
        self.remaining().is_some_and(|r| r.is_zero())
    }

    /// Bound a per-call timeout by the remaining overall budget
    pub fn clamp(&self, timeout: Duration) -> Duration {
        match self.remaining() {
            Some(remaining) => timeout.min(remaining),
            None => timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = DispatchParams::default();
        assert_eq!(params.per_call_timeout, Duration::from_secs(30));
        assert_eq!(params.max_retries, 2);
        assert_eq!(params.backoff_base, Duration::from_millis(500));
    }

    #[test]
    fn test_backoff_doubles() {
        let params = DispatchParams::default();
        assert_eq!(params.backoff_delay(1), Duration::from_millis(500));
        assert_eq!(params.backoff_delay(2), Duration::from_millis(1000));
        assert_eq!(params.backoff_delay(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_unbounded_deadline() {
        let deadline = Deadline::unbounded();
        assert!(deadline.remaining().is_none());
        assert!(!deadline.is_elapsed());
        assert_eq!(deadline.clamp(Duration::from_secs(5)), Duration::from_secs(5));
    }

    #[test]
    fn test_deadline_clamps_per_call_timeout() {
        let deadline = Deadline::within(Duration::from_secs(1));
        assert!(deadline.clamp(Duration::from_secs(30)) <= Duration::from_secs(1));
    }

    #[test]
    fn test_deadline_elapses() {
        let deadline = Deadline::within(Duration::ZERO);
        assert!(deadline.is_elapsed());
    }
}
