use async_trait::async_trait;
use crate::models::{ConversationTurn, HistoryStats, ModelProfile, UserModelSelection};
use crate::error::Result;

/// Conversation history storage
///
/// Every method is a single-row write or a single read; implementations
/// must make each inserted turn visible atomically.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Save a single turn
    async fn insert_turn(&self, turn: ConversationTurn) -> Result<()>;

    /// The `limit` most recent turns for a user, newest first
    async fn recent_turns(&self, user_id: &str, limit: usize) -> Result<Vec<ConversationTurn>>;

    /// Delete every turn for a user, returning how many were removed
    async fn delete_turns(&self, user_id: &str) -> Result<usize>;

    /// Total/user/assistant counts for a user
    async fn turn_counts(&self, user_id: &str) -> Result<HistoryStats>;
}

/// Read side of the model table, the allow-list and user selections
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Model by display name, enabled or not
    async fn model_by_name(&self, name: &str) -> Result<Option<ModelProfile>>;

    /// Enabled models in creation order
    async fn enabled_models(&self) -> Result<Vec<ModelProfile>>;

    /// Whether an identity is on the restricted-tier allow-list (case-insensitive)
    async fn is_allowlisted(&self, identity: &str) -> Result<bool>;

    async fn selection(&self, user_id: &str) -> Result<Option<UserModelSelection>>;

    /// Insert or replace a user's selection
    async fn save_selection(&self, user_id: &str, model_name: &str) -> Result<UserModelSelection>;
}

/// Write side of the catalog, used to seed stores (admin CRUD lives outside the core)
#[async_trait]
pub trait CatalogAdmin: CatalogStore {
    /// Insert or replace by name
    async fn upsert_model(&self, profile: ModelProfile) -> Result<()>;

    async fn remove_model(&self, name: &str) -> Result<bool>;

    async fn allow(&self, identity: &str) -> Result<()>;
}
