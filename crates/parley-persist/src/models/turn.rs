use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::PersistError;

/// One message in a user's conversation history. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: String,
    pub user_id: String,
    pub role: TurnRole,
    pub content: String,
    /// Model that was selected when the turn was written (informational)
    pub model_name: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(
        user_id: impl Into<String>,
        role: TurnRole,
        content: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            role,
            content: content.into(),
            model_name: model_name.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TurnRole {
    type Err = PersistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(TurnRole::User),
            "assistant" => Ok(TurnRole::Assistant),
            other => Err(PersistError::InvalidRecord(format!("unknown role '{}'", other))),
        }
    }
}

/// Per-user history counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total: usize,
    pub user_count: usize,
    pub assistant_count: usize,
}

// Conversion: ConversationTurn → parley_llm::Message
impl From<ConversationTurn> for parley_llm::Message {
    fn from(turn: ConversationTurn) -> Self {
        match turn.role {
            TurnRole::User => parley_llm::Message::human(turn.content),
            TurnRole::Assistant => parley_llm::Message::ai(turn.content),
        }
    }
}
