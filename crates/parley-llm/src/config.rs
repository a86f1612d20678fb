// Provider configuration: endpoint, attribution headers and the retry budget

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";

/// Configuration for the completion provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL, `/chat/completions` is appended
    pub base_url: String,
    /// Per-attempt timeout
    pub request_timeout_ms: u64,
    /// Total attempts per dispatch, including the first
    pub max_attempts: u32,
    /// Backoff unit; a 429 on attempt `n` waits `2^n` units
    pub backoff_unit_ms: u64,
    /// Sent as `HTTP-Referer` (OpenRouter app attribution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
    /// Sent as `X-Title` (OpenRouter app attribution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: OPENROUTER_API_BASE.to_string(),
            request_timeout_ms: 60_000,
            max_attempts: 3,
            backoff_unit_ms: 1000,
            referer: None,
            title: None,
        }
    }
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit_ms = unit.as_millis() as u64;
        self
    }

    pub fn with_attribution(mut self, referer: impl Into<String>, title: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self.title = Some(title.into());
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }

    /// Full endpoint for chat completions
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Upper bound on one dispatch: every attempt times out and every
    /// retry gap is a full backoff
    pub fn worst_case_latency(&self) -> Duration {
        let attempts = self.max_attempts.max(1);
        let backoff: Duration = (0..attempts - 1)
            .map(|n| self.backoff_unit() * 2u32.saturating_pow(n))
            .sum();
        self.request_timeout() * attempts + backoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.backoff_unit(), Duration::from_secs(1));
        assert_eq!(config.completions_url(), "https://openrouter.ai/api/v1/chat/completions");
    }

    #[test]
    fn test_worst_case_latency() {
        // 3 x 60s + (1s + 2s)
        let config = ProviderConfig::default();
        assert_eq!(config.worst_case_latency(), Duration::from_secs(183));
    }

    #[test]
    fn test_sub_second_request_timeout_is_kept() {
        let config = ProviderConfig::new().with_request_timeout(Duration::from_millis(500));
        assert_eq!(config.request_timeout(), Duration::from_millis(500));

        let config = config.with_request_timeout(Duration::from_millis(1500));
        assert_eq!(config.request_timeout(), Duration::from_millis(1500));
        // 3 x 1.5s + (1s + 2s)
        assert_eq!(config.worst_case_latency(), Duration::from_millis(7500));
    }

    #[test]
    fn test_trailing_slash_in_base_url() {
        let config = ProviderConfig::new().with_base_url("http://localhost:1234/v1/");
        assert_eq!(config.completions_url(), "http://localhost:1234/v1/chat/completions");
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: ProviderConfig = serde_json::from_str(r#"{"max_attempts": 5}"#).unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.base_url, OPENROUTER_API_BASE);
    }
}
