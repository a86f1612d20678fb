use parley_persist::DEFAULT_WINDOW;
use serde::{Deserialize, Serialize};

use crate::chunking::ChunkPolicy;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub system_prompt: String,
    /// Turns of history sent with each request
    pub context_limit: usize,
    pub chunking: ChunkPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            context_limit: DEFAULT_WINDOW,
            chunking: ChunkPolicy::default(),
        }
    }
}

impl DispatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_context_limit(mut self, limit: usize) -> Self {
        self.context_limit = limit;
        self
    }

    pub fn with_chunking(mut self, chunking: ChunkPolicy) -> Self {
        self.chunking = chunking;
        self
    }
}
