//! Dispatch policy configuration from TOML (`[dispatch]` section)

use flare_application::DispatchParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[dispatch]` section — fan-out timeout and retry policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDispatchConfig {
    /// Per-model-call timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Retries after the first attempt, transient failures only
    pub max_retries: Option<u32>,
    /// First retry delay in milliseconds; doubles per attempt
    pub backoff_ms: Option<u64>,
    /// Overall deadline for one command, in seconds
    pub overall_timeout_secs: Option<u64>,
}

impl FileDispatchConfig {
    /// Merge the configured values over the defaults
    pub fn to_params(&self) -> DispatchParams {
        let mut params = DispatchParams::default();
        if let Some(secs) = self.timeout_secs {
            params = params.with_per_call_timeout(Duration::from_secs(secs));
        }
        if let Some(retries) = self.max_retries {
            params = params.with_max_retries(retries);
        }
        if let Some(ms) = self.backoff_ms {
            params = params.with_backoff_base(Duration::from_millis(ms));
        }
        params
    }

    pub fn overall_timeout(&self) -> Option<Duration> {
        self.overall_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_section_keeps_defaults() {
        let config = FileDispatchConfig::default();
        let params = config.to_params();
        assert_eq!(params.per_call_timeout, Duration::from_secs(30));
        assert_eq!(params.max_retries, 2);
        assert!(config.overall_timeout().is_none());
    }

    #[test]
    fn test_values_override_defaults() {
        let toml_str = r#"
timeout_secs = 5
max_retries = 1
backoff_ms = 100
overall_timeout_secs = 60
"#;
        let config: FileDispatchConfig = toml::from_str(toml_str).unwrap();
        let params = config.to_params();
        assert_eq!(params.per_call_timeout, Duration::from_secs(5));
        assert_eq!(params.max_retries, 1);
        assert_eq!(params.backoff_base, Duration::from_millis(100));
        assert_eq!(config.overall_timeout(), Some(Duration::from_secs(60)));
    }
}
