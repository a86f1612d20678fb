//! High-level builder API for wiring a dispatch engine

use crate::{
    CompletionClient, DispatchConfig, DispatchCoordinator, DispatchRequest, DispatchResult,
    ModelProfile, PersistBuilder, ProviderConfig, StorageConfig, Stores,
};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Storage plus a coordinator over it
#[derive(Clone)]
pub struct Engine {
    pub coordinator: DispatchCoordinator,
    pub stores: Stores,
}

impl Engine {
    /// Dispatch a text turn where the user is also the requester
    pub async fn chat(&self, user_id: &str, text: &str) -> DispatchResult {
        self.coordinator
            .dispatch(DispatchRequest::new(user_id, text))
            .await
    }
}

/// High-level builder for creating a dispatch engine
///
/// # Example
///
/// ```rust,no_run
/// use parley::prelude::*;
///
/// # #[tokio::main]
/// # async fn main() -> Result<()> {
/// let engine = EngineBuilder::new()
///     .model(ModelProfile::new("Haiku", "anthropic/claude-3-haiku", "sk-or-..."))
///     .system_prompt("You are a terse assistant.")
///     .build()
///     .await?;
///
/// engine.coordinator.catalog().select("user-1", "Haiku").await?;
/// let reply = engine.chat("user-1", "Hello!").await;
/// println!("{}", reply.user_message());
/// # Ok(())
/// # }
/// ```
pub struct EngineBuilder {
    storage: StorageConfig,
    config: DispatchConfig,
    provider: ProviderConfig,
    models: Vec<ModelProfile>,
    allowlist: Vec<String>,
    client: Option<Arc<dyn CompletionClient>>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    /// In-memory storage, OpenRouter defaults
    pub fn new() -> Self {
        Self {
            storage: StorageConfig::Memory,
            config: DispatchConfig::default(),
            provider: ProviderConfig::default(),
            models: Vec::new(),
            allowlist: Vec::new(),
            client: None,
        }
    }

    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Config for the HTTP client; ignored when `client` is set
    pub fn provider(mut self, provider: ProviderConfig) -> Self {
        self.provider = provider;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    /// Turns of history sent with each request (default: 10)
    pub fn context_limit(mut self, limit: usize) -> Self {
        self.config.context_limit = limit;
        self
    }

    /// Add a model to the catalog at build time
    pub fn model(mut self, profile: ModelProfile) -> Self {
        self.models.push(profile);
        self
    }

    /// Allow an identity to use restricted models
    pub fn allow(mut self, identity: impl Into<String>) -> Self {
        self.allowlist.push(identity.into());
        self
    }

    /// Replace the HTTP client (e.g. with a scripted one)
    pub fn client(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub async fn build(self) -> Result<Engine> {
        let stores = PersistBuilder::new()
            .storage(self.storage)
            .build()
            .await
            .context("Failed to open storage")?;

        for profile in self.models {
            stores.admin.upsert_model(profile).await?;
        }
        for identity in &self.allowlist {
            stores.admin.allow(identity).await?;
        }

        let mut builder = DispatchCoordinator::builder()
            .stores(&stores)
            .provider(self.provider)
            .config(self.config);
        if let Some(client) = self.client {
            builder = builder.client(client);
        }
        let coordinator = builder.build()?;

        Ok(Engine {
            coordinator,
            stores,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parley_llm::CompletionRequest;

    struct FixedClient;

    #[async_trait]
    impl CompletionClient for FixedClient {
        async fn complete(&self, request: CompletionRequest) -> parley_llm::error::Result<String> {
            Ok(format!("{} says hi", request.model))
        }
    }

    #[tokio::test]
    async fn test_engine_end_to_end() {
        let engine = EngineBuilder::new()
            .model(ModelProfile::new("Haiku", "anthropic/claude-3-haiku", "k"))
            .model(ModelProfile::new("R1", "deepseek/deepseek-r1", "k").restricted())
            .allow("carol")
            .client(Arc::new(FixedClient))
            .build()
            .await
            .unwrap();

        assert_eq!(engine.chat("carol", "hi").await, DispatchResult::NoModelSelected);

        engine.coordinator.catalog().select("carol", "R1").await.unwrap();
        assert_eq!(
            engine.chat("carol", "hi").await.user_message(),
            "deepseek/deepseek-r1 says hi"
        );

        engine.coordinator.catalog().select("dave", "R1").await.unwrap();
        assert_eq!(engine.chat("dave", "hi").await, DispatchResult::AuthDenied);
    }
}
