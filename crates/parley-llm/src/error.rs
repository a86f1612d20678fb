use thiserror::Error;

/// Terminal failure of one completion attempt sequence
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// 401: the model's API key was rejected
    #[error("Provider rejected the API key")]
    AuthInvalid,

    /// 400: the request itself was malformed
    #[error("Provider rejected the request: {message}")]
    BadRequest { message: String },

    /// 429 on every attempt
    #[error("Provider rate limit exceeded after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Per-attempt timeout on every attempt
    #[error("Provider timed out after {attempts} attempts")]
    Timeout { attempts: u32 },

    /// 2xx with no usable completion text
    #[error("Provider returned an empty completion")]
    Empty,

    /// Any other non-2xx status
    #[error("Provider returned HTTP {status}")]
    Http { status: u16 },

    /// Connection-level failure (DNS, refused, TLS)
    #[error("Could not reach provider: {message}")]
    Network { message: String },
}

impl ProviderError {
    /// Stable short name, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthInvalid => "auth_invalid",
            Self::BadRequest { .. } => "bad_request",
            Self::RateLimited { .. } => "rate_limited",
            Self::Timeout { .. } => "timeout",
            Self::Empty => "empty",
            Self::Http { .. } => "http",
            Self::Network { .. } => "network",
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
