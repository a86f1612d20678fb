pub mod models;
pub mod context;
pub mod dbs;
pub mod error;
pub mod builder;
pub mod trait_client;

pub use models::{
    AccessTier, ConversationTurn, HistoryStats, ModelProfile, TurnRole, UserModelSelection,
};
pub use context::{AppendOutcome, ContextStore, DEFAULT_WINDOW};
pub use dbs::MemoryStore;
#[cfg(feature = "sqlite")]
pub use dbs::SqliteStore;
pub use error::{PersistError, Result};
pub use builder::{PersistBuilder, StorageConfig, Stores};
pub use trait_client::{CatalogAdmin, CatalogStore, HistoryStore};
