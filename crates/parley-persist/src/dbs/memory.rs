use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{ConversationTurn, HistoryStats, ModelProfile, TurnRole, UserModelSelection};
use crate::trait_client::{CatalogAdmin, CatalogStore, HistoryStore};

#[derive(Default)]
struct MemoryState {
    /// Insertion order is chronological order
    turns: Vec<ConversationTurn>,
    models: Vec<ModelProfile>,
    selections: HashMap<String, UserModelSelection>,
    /// Lowercased identities
    allowlist: HashSet<String>,
}

/// Process-local store implementing every persistence trait.
///
/// Reads take a shared lock and copy out, so a concurrent insert is either
/// fully visible to a window read or not at all.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable a model by name; returns false if it does not exist
    pub async fn set_enabled(&self, name: &str, enabled: bool) -> bool {
        let mut state = self.state.write().await;
        match state.models.iter_mut().find(|m| m.name == name) {
            Some(model) => {
                model.is_enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub async fn disallow(&self, identity: &str) -> bool {
        self.state
            .write()
            .await
            .allowlist
            .remove(&identity.to_lowercase())
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn insert_turn(&self, turn: ConversationTurn) -> Result<()> {
        self.state.write().await.turns.push(turn);
        Ok(())
    }

    async fn recent_turns(&self, user_id: &str, limit: usize) -> Result<Vec<ConversationTurn>> {
        let state = self.state.read().await;
        Ok(state
            .turns
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn delete_turns(&self, user_id: &str) -> Result<usize> {
        let mut state = self.state.write().await;
        let before = state.turns.len();
        state.turns.retain(|t| t.user_id != user_id);
        Ok(before - state.turns.len())
    }

    async fn turn_counts(&self, user_id: &str) -> Result<HistoryStats> {
        let state = self.state.read().await;
        let mut stats = HistoryStats::default();
        for turn in state.turns.iter().filter(|t| t.user_id == user_id) {
            stats.total += 1;
            match turn.role {
                TurnRole::User => stats.user_count += 1,
                TurnRole::Assistant => stats.assistant_count += 1,
            }
        }
        Ok(stats)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn model_by_name(&self, name: &str) -> Result<Option<ModelProfile>> {
        let state = self.state.read().await;
        Ok(state.models.iter().find(|m| m.name == name).cloned())
    }

    async fn enabled_models(&self) -> Result<Vec<ModelProfile>> {
        let state = self.state.read().await;
        Ok(state.models.iter().filter(|m| m.is_enabled).cloned().collect())
    }

    async fn is_allowlisted(&self, identity: &str) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.allowlist.contains(&identity.to_lowercase()))
    }

    async fn selection(&self, user_id: &str) -> Result<Option<UserModelSelection>> {
        let state = self.state.read().await;
        Ok(state.selections.get(user_id).cloned())
    }

    async fn save_selection(&self, user_id: &str, model_name: &str) -> Result<UserModelSelection> {
        let selection = UserModelSelection {
            user_id: user_id.to_string(),
            model_name: model_name.to_string(),
            updated_at: Utc::now(),
        };
        self.state
            .write()
            .await
            .selections
            .insert(user_id.to_string(), selection.clone());
        Ok(selection)
    }
}

#[async_trait]
impl CatalogAdmin for MemoryStore {
    async fn upsert_model(&self, profile: ModelProfile) -> Result<()> {
        let mut state = self.state.write().await;
        match state.models.iter_mut().find(|m| m.name == profile.name) {
            Some(existing) => *existing = profile,
            None => state.models.push(profile),
        }
        Ok(())
    }

    async fn remove_model(&self, name: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.models.len();
        state.models.retain(|m| m.name != name);
        Ok(state.models.len() != before)
    }

    async fn allow(&self, identity: &str) -> Result<()> {
        self.state
            .write()
            .await
            .allowlist
            .insert(identity.to_lowercase());
        Ok(())
    }
}
