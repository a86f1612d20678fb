pub mod config;
pub mod error;
pub mod openrouter;
pub mod retry;
pub mod traits;
pub mod transport;
pub mod types;

pub use config::{ProviderConfig, OPENROUTER_API_BASE};
pub use error::ProviderError;
pub use openrouter::{ChatCompletionBody, ProviderClient, UserTurn};
pub use retry::{RetryPolicy, Sleeper, Step, TokioSleeper};
pub use traits::{CompletionClient, CompletionRequest};
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};
pub use types::{Content, ContentPart, Message, ModelFamily, RequestShape};
