//! # Parley - conversational dispatch for hosted language models
//!
//! Parley routes chat turns to models behind an OpenRouter-compatible
//! `chat/completions` endpoint. Each user picks a model; every turn is sent
//! with a bounded window of that user's recent history, retried on rate
//! limits and timeouts, and split into transport-sized chunks.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parley::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = EngineBuilder::new()
//!         .model(ModelProfile::new("GPT-4o", "openai/gpt-4o", std::env::var("OPENROUTER_API_KEY")?))
//!         .build()
//!         .await?;
//!
//!     engine.coordinator.catalog().select("user-1", "GPT-4o").await?;
//!
//!     for chunk in engine.chat("user-1", "Explain Rust ownership").await.into_chunks() {
//!         println!("{}", chunk);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **parley-llm**: request/response types, request shapes, the retry state
//!   machine and the HTTP transport
//! - **parley-persist**: conversation history, model catalog storage, context
//!   windows (in-memory, or SQLite with the `sqlite` feature)
//! - **parley-dispatch**: model catalog, access checks and the per-turn
//!   coordinator
//!
//! ## Features
//!
//! - `sqlite`: SQLite storage backend

// Re-export all public APIs
pub use parley_dispatch as dispatch;
pub use parley_llm as llm;
pub use parley_persist as persist;

// Re-export commonly used types
pub use parley_dispatch::{
    ChunkPolicy, DispatchConfig, DispatchCoordinator, DispatchRequest, DispatchResult,
    ModelCatalog, UnavailableReason,
};
pub use parley_llm::{CompletionClient, Content, Message, ProviderClient, ProviderConfig, ProviderError};
pub use parley_persist::{
    AccessTier, ContextStore, HistoryStats, ModelProfile, PersistBuilder, StorageConfig, Stores,
};

/// High-level builder for wiring storage and a coordinator
pub mod builder;

/// Convenient prelude with commonly used types
pub mod prelude {
    pub use crate::builder::{Engine, EngineBuilder};
    pub use crate::dispatch::{DispatchRequest, DispatchResult};
    pub use crate::llm::ProviderConfig;
    pub use crate::persist::{AccessTier, ModelProfile, StorageConfig};
    pub use anyhow::Result;
}
