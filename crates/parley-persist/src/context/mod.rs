mod store;

pub use store::{AppendOutcome, ContextStore, DEFAULT_WINDOW};
