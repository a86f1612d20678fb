use parley_llm::{CompletionClient, CompletionRequest, Message, ProviderError, UserTurn};
use parley_persist::{ContextStore, HistoryStats, ModelProfile, PersistError, TurnRole};
use std::sync::Arc;
use std::time::Instant;

use crate::catalog::{Access, CatalogError, ModelCatalog};
use crate::types::{DispatchConfig, DispatchRequest, DispatchResult, UnavailableReason};

/// Runs one user turn end to end:
/// resolve model, check access, read context, store the user turn,
/// generate, store the reply, chunk.
///
/// Stateless between calls. Concurrent dispatches for the same user are not
/// serialized and may see the same window.
#[derive(Clone)]
pub struct DispatchCoordinator {
    catalog: ModelCatalog,
    context: ContextStore,
    client: Arc<dyn CompletionClient>,
    config: DispatchConfig,
}

impl DispatchCoordinator {
    pub fn new(
        catalog: ModelCatalog,
        context: ContextStore,
        client: Arc<dyn CompletionClient>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            catalog,
            context,
            client,
            config,
        }
    }

    /// Create a builder for fluent construction
    pub fn builder() -> crate::builder::DispatchBuilder {
        crate::builder::DispatchBuilder::new()
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn context(&self) -> &ContextStore {
        &self.context
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub async fn dispatch(&self, request: DispatchRequest) -> DispatchResult {
        let start = Instant::now();
        let user_id = request.user_id.clone();

        let result = self.run(request).await;

        tracing::info!(
            user_id = %user_id,
            outcome = result.label(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Dispatch finished"
        );
        result
    }

    async fn run(&self, request: DispatchRequest) -> DispatchResult {
        let DispatchRequest {
            user_id,
            requester,
            text,
            image,
        } = request;

        // 1. Resolve model
        tracing::debug!(user_id = %user_id, "Resolving model");
        let selection = match self.catalog.current_selection(&user_id).await {
            Ok(Some(selection)) => selection,
            Ok(None) => return DispatchResult::NoModelSelected,
            Err(e) => {
                tracing::error!(user_id = %user_id, "Failed to read model selection: {}", e);
                return unavailable(UnavailableReason::Missing);
            }
        };

        let profile = match self.usable_profile(&selection.model_name).await {
            Ok(profile) => profile,
            Err(result) => return result,
        };

        // 2. Check access
        tracing::debug!(user_id = %user_id, model = %profile.name, "Checking access");
        match self.catalog.authorize(&profile, &requester).await {
            Ok(Access::Allowed) => {}
            Ok(Access::Denied) => return DispatchResult::AuthDenied,
            Err(e) => {
                tracing::error!(user_id = %user_id, "Failed to read allow-list: {}", e);
                return DispatchResult::AuthDenied;
            }
        }

        // 3. Fetch context
        tracing::debug!(user_id = %user_id, limit = self.config.context_limit, "Fetching context");
        let mut memory_degraded = false;
        let context = match self.context.window(&user_id, self.config.context_limit).await {
            Ok(window) => window,
            Err(e) => {
                tracing::warn!(user_id = %user_id, "Context unavailable, continuing without it: {}", e);
                memory_degraded = true;
                Vec::new()
            }
        };

        // 4. Persist user turn
        tracing::debug!(user_id = %user_id, "Persisting user turn");
        memory_degraded |= self
            .context
            .append(&user_id, TurnRole::User, &text, &profile.name)
            .await
            .is_degraded();

        // 5. Generate
        tracing::debug!(user_id = %user_id, model = %profile.provider_id, context_len = context.len(), "Generating");
        let mut turn = UserTurn::text(text);
        if let Some(image) = image {
            turn = turn.with_image(image);
        }
        let reply = match self.generate(&profile, context, turn).await {
            Ok(reply) => reply,
            Err(result) => return result,
        };

        // 6. Persist reply
        tracing::debug!(user_id = %user_id, "Persisting assistant turn");
        memory_degraded |= self
            .context
            .append(&user_id, TurnRole::Assistant, &reply, &profile.name)
            .await
            .is_degraded();

        // 7. Chunk
        let chunks = self.config.chunking.split(&reply);
        tracing::debug!(user_id = %user_id, chunks = chunks.len(), "Chunked reply");

        DispatchResult::Success {
            text: reply,
            chunks,
            memory_degraded,
        }
    }

    /// Send one context-free turn to a model, ignoring selection and access
    /// tier. Nothing is persisted. Disabled models can be probed.
    pub async fn probe(&self, model_name: &str, prompt: &str) -> DispatchResult {
        let profile = match self.catalog.resolve(model_name).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(model = %model_name, "Probe target unavailable: {}", e);
                return unavailable(UnavailableReason::Missing);
            }
        };

        tracing::info!(model = %profile.name, provider_id = %profile.provider_id, "Probing model");
        match self.generate(&profile, Vec::new(), UserTurn::text(prompt)).await {
            Ok(text) => DispatchResult::Success {
                chunks: self.config.chunking.split(&text),
                text,
                memory_degraded: false,
            },
            Err(result) => result,
        }
    }

    pub async fn clear_history(&self, user_id: &str) -> Result<usize, PersistError> {
        self.context.clear(user_id).await
    }

    pub async fn history_stats(&self, user_id: &str) -> Result<HistoryStats, PersistError> {
        self.context.stats(user_id).await
    }

    async fn usable_profile(&self, model_name: &str) -> Result<ModelProfile, DispatchResult> {
        match self.catalog.resolve(model_name).await {
            Ok(profile) if profile.is_enabled => Ok(profile),
            Ok(profile) => {
                tracing::debug!(model = %profile.name, "Selected model is disabled");
                Err(unavailable(UnavailableReason::Disabled))
            }
            Err(CatalogError::NotFound { name, .. }) => {
                tracing::debug!(model = %name, "Selected model no longer exists");
                Err(unavailable(UnavailableReason::Missing))
            }
            Err(e) => {
                tracing::error!(model = %model_name, "Failed to read model catalog: {}", e);
                Err(unavailable(UnavailableReason::Missing))
            }
        }
    }

    /// One attempt sequence, bounded by the client's worst-case latency
    async fn generate(
        &self,
        profile: &ModelProfile,
        context: Vec<Message>,
        turn: UserTurn,
    ) -> Result<String, DispatchResult> {
        let request = CompletionRequest::new(&profile.provider_id, &profile.api_key, turn)
            .with_system_prompt(&self.config.system_prompt)
            .with_context(context)
            .with_shape(self.catalog.request_shape(profile));

        let Some(budget) = self.client.budget() else {
            return map_completion(self.client.complete(request).await);
        };

        let deadline = budget.worst_case_latency();
        match tokio::time::timeout(deadline, self.client.complete(request)).await {
            Ok(outcome) => map_completion(outcome),
            Err(_) => {
                tracing::warn!(
                    model = %profile.name,
                    deadline_ms = deadline.as_millis() as u64,
                    "Generation exceeded the dispatch deadline"
                );
                Err(DispatchResult::ProviderError {
                    kind: ProviderError::Timeout {
                        attempts: budget.max_attempts,
                    },
                })
            }
        }
    }
}

fn map_completion(outcome: Result<String, ProviderError>) -> Result<String, DispatchResult> {
    match outcome {
        Ok(text) => Ok(text),
        Err(ProviderError::Empty) => Err(DispatchResult::Empty),
        Err(kind) => Err(DispatchResult::ProviderError { kind }),
    }
}

fn unavailable(reason: UnavailableReason) -> DispatchResult {
    DispatchResult::ModelUnavailable { reason }
}
