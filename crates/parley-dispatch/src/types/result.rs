use parley_llm::ProviderError;
use serde::Serialize;

/// Why a selected model could not be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// No profile with that name (or the catalog could not be read)
    Missing,
    Disabled,
}

/// Outcome of one dispatch. Every failure is a value; nothing escapes as an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchResult {
    Success {
        text: String,
        /// `text` split for the transport, in order
        chunks: Vec<String>,
        /// A history read or write failed during this turn
        memory_degraded: bool,
    },
    NoModelSelected,
    ModelUnavailable {
        reason: UnavailableReason,
    },
    AuthDenied,
    ProviderError {
        #[serde(serialize_with = "serialize_kind")]
        kind: ProviderError,
    },
    Empty,
}

fn serialize_kind<S: serde::Serializer>(kind: &ProviderError, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(kind.kind())
}

impl DispatchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchResult::Success { .. })
    }

    /// Stable short name for logs
    pub fn label(&self) -> &'static str {
        match self {
            DispatchResult::Success { .. } => "success",
            DispatchResult::NoModelSelected => "no_model_selected",
            DispatchResult::ModelUnavailable { .. } => "model_unavailable",
            DispatchResult::AuthDenied => "auth_denied",
            DispatchResult::ProviderError { .. } => "provider_error",
            DispatchResult::Empty => "empty",
        }
    }

    /// The chunks to deliver; failures are a single message
    pub fn into_chunks(self) -> Vec<String> {
        match self {
            DispatchResult::Success { chunks, .. } => chunks,
            other => vec![other.user_message()],
        }
    }

    /// Text shown to the user for this outcome. Success returns the reply itself.
    pub fn user_message(&self) -> String {
        match self {
            DispatchResult::Success { text, .. } => text.clone(),
            DispatchResult::NoModelSelected => {
                "❌ You haven't set a model yet! Use `/change` to set your preferred model."
                    .to_string()
            }
            DispatchResult::ModelUnavailable { .. } => {
                "❌ Your selected model is not available. Please use `/change` to select a different model."
                    .to_string()
            }
            DispatchResult::AuthDenied => {
                "❌ This model is restricted to team members only. Please contact the team owner for access."
                    .to_string()
            }
            DispatchResult::Empty => {
                "❌ Sorry, I couldn't generate a response. Please try again.".to_string()
            }
            DispatchResult::ProviderError { kind } => provider_message(kind),
        }
    }
}

fn provider_message(kind: &ProviderError) -> String {
    match kind {
        ProviderError::AuthInvalid => {
            "❌ The provider rejected this model's API key. Please ask an administrator to update it."
                .to_string()
        }
        ProviderError::BadRequest { .. } => {
            "❌ The provider rejected the request as malformed.".to_string()
        }
        ProviderError::RateLimited { .. } => {
            "❌ The model is rate limited right now. Please try again in a moment.".to_string()
        }
        ProviderError::Timeout { .. } => {
            "❌ The model took too long to respond. Please try again.".to_string()
        }
        ProviderError::Http { status } => format!(
            "❌ The provider returned an error (HTTP {}). Please try again later.",
            status
        ),
        ProviderError::Network { .. } => {
            "❌ Could not reach the model provider. Please try again later.".to_string()
        }
        ProviderError::Empty => {
            "❌ Sorry, I couldn't generate a response. Please try again.".to_string()
        }
    }
}
