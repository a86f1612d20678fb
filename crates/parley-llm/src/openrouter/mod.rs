pub mod client;
pub mod response;

pub use client::ProviderClient;
pub use response::{build_body, error_message, parse_completion, turn_content, ChatCompletionBody, UserTurn};
