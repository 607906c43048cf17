//! AI assistant error types.

use thiserror::Error;

use crate::env::EnvError;

/// AI assistant errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AiError {
    /// No API key configured for the provider.
    #[error("Missing API key for provider {0}")]
    MissingApiKey(String),

    /// Transport failure, non-success status or unreadable response.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider asked us to slow down (HTTP 429).
    #[error("Rate limited by provider {0}")]
    RateLimited(String),

    /// The request did not complete in time.
    #[error("Request timed out after {0} ms")]
    Timeout(u64),
}

impl AiError {
    /// Create a new provider error.
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }
}

/// Error code for programmatic handling by API clients.
impl AiError {
    pub fn code(&self) -> &'static str {
        match self {
            AiError::MissingApiKey(_) => "MISSING_API_KEY",
            AiError::Provider(_) => "PROVIDER_ERROR",
            AiError::RateLimited(_) => "RATE_LIMITED",
            AiError::Timeout(_) => "TIMEOUT",
        }
    }
}

impl From<EnvError> for AiError {
    fn from(err: EnvError) -> Self {
        match err {
            EnvError::MissingApiKey(provider) => AiError::MissingApiKey(provider),
        }
    }
}
