pub mod config;
pub mod request;
pub mod result;

pub use config::{DispatchConfig, DEFAULT_SYSTEM_PROMPT};
pub use request::DispatchRequest;
pub use result::{DispatchResult, UnavailableReason};
