use std::sync::Arc;
use parley_llm::Message;

use crate::error::Result;
use crate::models::{ConversationTurn, HistoryStats, TurnRole};
use crate::trait_client::HistoryStore;

/// Turns fed back to the model on every dispatch (about five exchanges)
pub const DEFAULT_WINDOW: usize = 10;

/// Whether an append reached the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Stored,
    /// The store rejected the write; the conversation goes on without it
    Degraded,
}

impl AppendOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, AppendOutcome::Degraded)
    }
}

/// Bounded per-user conversation memory over a [`HistoryStore`]
#[derive(Clone)]
pub struct ContextStore {
    history: Arc<dyn HistoryStore>,
}

impl ContextStore {
    pub fn new(history: Arc<dyn HistoryStore>) -> Self {
        Self { history }
    }

    /// Persist one turn. Storage errors are logged, never returned.
    pub async fn append(
        &self,
        user_id: &str,
        role: TurnRole,
        content: &str,
        model_name: &str,
    ) -> AppendOutcome {
        let turn = ConversationTurn::new(user_id, role, content, model_name);

        match self.history.insert_turn(turn).await {
            Ok(()) => {
                tracing::debug!(user_id = %user_id, role = %role, "Turn stored");
                AppendOutcome::Stored
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    role = %role,
                    error = %e,
                    "Failed to store conversation turn, continuing without it"
                );
                AppendOutcome::Degraded
            }
        }
    }

    /// The `limit` most recent turns, oldest first, as provider messages
    pub async fn window(&self, user_id: &str, limit: usize) -> Result<Vec<Message>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut turns = self.history.recent_turns(user_id, limit).await?;
        turns.reverse();

        Ok(turns.into_iter().map(Message::from).collect())
    }

    /// Remove a user's whole history, returning how many turns were deleted
    pub async fn clear(&self, user_id: &str) -> Result<usize> {
        let removed = self.history.delete_turns(user_id).await?;
        tracing::info!(user_id = %user_id, removed, "Conversation history cleared");
        Ok(removed)
    }

    pub async fn stats(&self, user_id: &str) -> Result<HistoryStats> {
        self.history.turn_counts(user_id).await
    }
}
