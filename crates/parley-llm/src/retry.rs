// Retry/backoff state machine for one dispatch.
//
// Three failure classes:
//   429      -> retry after 2^n backoff units
//   timeout  -> retry immediately
//   anything else non-2xx, or an unusable 2xx -> terminal

use async_trait::async_trait;
use std::time::Duration;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::openrouter::parse_completion;
use crate::transport::{TransportError, TransportResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl From<&ProviderConfig> for RetryPolicy {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff_unit: config.backoff_unit(),
        }
    }
}

impl RetryPolicy {
    /// Delay before retrying after a 429 on attempt `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit * 2u32.saturating_pow(attempt.min(30))
    }

    fn is_last(&self, attempt: u32) -> bool {
        attempt + 1 >= self.max_attempts
    }
}

/// Where the state machine goes after observing one attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Succeeded(String),
    /// Go to `Attempting(n+1)`, optionally sleeping first
    Retry { delay: Option<Duration> },
    Failed(ProviderError),
}

/// Pure transition function for `Attempting(attempt)`
pub fn next_step(
    policy: &RetryPolicy,
    attempt: u32,
    outcome: &std::result::Result<TransportResponse, TransportError>,
) -> Step {
    let response = match outcome {
        Ok(response) => response,
        Err(TransportError::Timeout) => {
            return if policy.is_last(attempt) {
                Step::Failed(ProviderError::Timeout {
                    attempts: attempt + 1,
                })
            } else {
                Step::Retry { delay: None }
            };
        }
        Err(TransportError::Connect(message)) => {
            return Step::Failed(ProviderError::Network {
                message: message.clone(),
            });
        }
    };

    match response.status {
        200..=299 => match parse_completion(&response.body) {
            Some(text) => Step::Succeeded(text),
            None => Step::Failed(ProviderError::Empty),
        },
        429 if policy.is_last(attempt) => Step::Failed(ProviderError::RateLimited {
            attempts: attempt + 1,
        }),
        429 => Step::Retry {
            delay: Some(policy.backoff(attempt)),
        },
        401 => Step::Failed(ProviderError::AuthInvalid),
        400 => Step::Failed(ProviderError::BadRequest {
            message: crate::openrouter::error_message(&response.body),
        }),
        status => Step::Failed(ProviderError::Http { status }),
    }
}

/// Suspends the dispatching task between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
