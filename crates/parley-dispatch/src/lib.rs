pub mod builder;
pub mod catalog;
pub mod chunking;
pub mod coordinator;
pub mod types;

pub use builder::DispatchBuilder;
pub use catalog::{
    Access, CatalogError, ModelCatalog, ModelSummary, ShapeRule, ShapeTable, MAX_SUGGESTIONS,
};
pub use chunking::ChunkPolicy;
pub use coordinator::DispatchCoordinator;
pub use types::{
    DispatchConfig, DispatchRequest, DispatchResult, UnavailableReason, DEFAULT_SYSTEM_PROMPT,
};
