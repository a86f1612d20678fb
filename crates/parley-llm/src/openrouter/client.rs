// OpenRouter-compatible chat completions client

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::ProviderConfig;
use crate::error::Result;
use crate::openrouter::build_body;
use crate::retry::{next_step, RetryPolicy, Sleeper, Step, TokioSleeper};
use crate::traits::{CompletionClient, CompletionRequest};
use crate::transport::{HttpTransport, Transport};

/// Completion client holding its own config, transport and sleeper.
/// Cheap to share behind an `Arc`; no global state.
pub struct ProviderClient {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    config: ProviderConfig,
    policy: RetryPolicy,
}

impl ProviderClient {
    /// Client over HTTP with real sleeps
    pub fn new(config: ProviderConfig) -> AnyResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport), Arc::new(TokioSleeper)))
    }

    /// Client over any transport/sleeper pair (scripted ones in tests)
    pub fn with_transport(
        config: ProviderConfig,
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let policy = RetryPolicy::from(&config);
        Self {
            transport,
            sleeper,
            config,
            policy,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run the attempt sequence for one request
    pub async fn generate(&self, request: &CompletionRequest) -> Result<String> {
        let body = build_body(
            &request.model,
            &request.shape,
            &request.system_prompt,
            &request.context,
            &request.turn,
        );
        let url = self.config.completions_url();
        let timeout = self.config.request_timeout();

        let mut attempt = 0;
        loop {
            let outcome = self
                .transport
                .post(&url, &request.api_key, &body, timeout)
                .await;

            match next_step(&self.policy, attempt, &outcome) {
                Step::Succeeded(text) => {
                    tracing::debug!(model = %request.model, attempt, "Completion succeeded");
                    return Ok(text);
                }
                Step::Failed(err) => {
                    tracing::warn!(
                        model = %request.model,
                        attempt,
                        kind = err.kind(),
                        "Completion failed: {}",
                        err
                    );
                    return Err(err);
                }
                Step::Retry { delay } => {
                    tracing::warn!(
                        model = %request.model,
                        attempt,
                        delay_ms = delay.map(|d| d.as_millis() as u64).unwrap_or(0),
                        "Retrying completion"
                    );
                    if let Some(delay) = delay {
                        self.sleeper.sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl CompletionClient for ProviderClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.generate(&request).await
    }

    fn budget(&self) -> Option<&ProviderConfig> {
        Some(&self.config)
    }
}
