use async_trait::async_trait;
use std::fmt;

use crate::config::ProviderConfig;
use crate::error::Result;
use crate::openrouter::UserTurn;
use crate::types::{Message, RequestShape};

/// Trait for completion providers
///
/// One call is one full attempt sequence (retries included).
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Retry budget `complete` runs under, if any.
    /// Callers bound one call by its `worst_case_latency()`.
    fn budget(&self) -> Option<&ProviderConfig> {
        None
    }
}

#[derive(Clone)]
pub struct CompletionRequest {
    /// Wire model id (e.g. `openai/gpt-4o`)
    pub model: String,
    pub api_key: String,
    pub system_prompt: String,
    pub context: Vec<Message>,
    pub turn: UserTurn,
    pub shape: RequestShape,
}

impl fmt::Debug for CompletionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionRequest")
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("context_len", &self.context.len())
            .field("shape", &self.shape)
            .finish()
    }
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>, turn: UserTurn) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            system_prompt: String::new(),
            context: Vec::new(),
            turn,
            shape: RequestShape::default(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_context(mut self, context: Vec<Message>) -> Self {
        self.context = context;
        self
    }

    pub fn with_shape(mut self, shape: RequestShape) -> Self {
        self.shape = shape;
        self
    }
}
