mod catalog;
mod turn;

// Export database-agnostic models
pub use catalog::{AccessTier, ModelProfile, UserModelSelection};
pub use turn::{ConversationTurn, HistoryStats, TurnRole};
