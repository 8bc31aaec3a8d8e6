use thiserror::Error;

/// Errors from an LLM provider or the gateway in front of them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AiError {
    #[error("Invalid {provider} API key")]
    InvalidCredentials { provider: &'static str },

    #[error("{provider} API rate limit exceeded")]
    RateLimited { provider: &'static str },

    #[error("No AI provider is configured")]
    NoProviderConfigured,

    #[error("Malformed {provider} response: {detail}")]
    MalformedResponse {
        provider: &'static str,
        detail: String,
    },

    #[error("{provider} API request failed with status {status}")]
    Upstream { provider: &'static str, status: u16 },

    #[error("{provider} request failed: {detail}")]
    Transport {
        provider: &'static str,
        detail: String,
    },

    #[error("AI request timed out after {0}s")]
    Timeout(u64),
}

impl AiError {
    /// HTTP status the API layer should answer with. Timeouts share the
    /// upstream-failure status.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCredentials { .. } => 401,
            Self::RateLimited { .. } => 429,
            Self::NoProviderConfigured => 503,
            Self::MalformedResponse { .. }
            | Self::Upstream { .. }
            | Self::Transport { .. }
            | Self::Timeout(_) => 502,
        }
    }

    /// Map a non-success provider response.
    pub(crate) fn from_status(provider: &'static str, status: u16) -> Self {
        match status {
            401 | 403 => Self::InvalidCredentials { provider },
            429 => Self::RateLimited { provider },
            _ => Self::Upstream { provider, status },
        }
    }

    pub(crate) fn transport(provider: &'static str, err: reqwest::Error) -> Self {
        // Gemini carries the key in the query string; keep URLs out of messages.
        Self::Transport {
            provider,
            detail: err.without_url().to_string(),
        }
    }

    pub(crate) fn malformed(provider: &'static str, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider,
            detail: detail.into(),
        }
    }
}
