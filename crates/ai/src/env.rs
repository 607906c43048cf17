//! Environment abstraction for secrets and time.
//!
//! The assistant client never reads process state directly. The server
//! builds a [`RuntimeEnvironment`] once at startup, and tests swap in
//! [`test_env::MockEnvironment`].

use chrono::{DateTime, Utc};
use log::error;

/// Primary variable holding the Gemini API key.
pub const API_KEY_VAR: &str = "API_KEY";

/// Secondary variable checked when `API_KEY` is unset.
pub const FALLBACK_API_KEY_VAR: &str = "GEMINI_API_KEY";

pub const PROVIDER_ID: &str = "gemini";

/// Environment abstraction for runtime dependencies.
pub trait AiEnvironment: Send + Sync {
    /// API key for the remote model.
    ///
    /// A missing key is only an error at the moment a request needs it.
    fn api_key(&self) -> Result<String, EnvError>;

    /// Get the current time.
    /// Abstracted for testing purposes.
    fn now(&self) -> DateTime<Utc>;
}

/// Environment errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EnvError {
    /// API key required but not configured.
    #[error("API key required for provider: {0}")]
    MissingApiKey(String),
}

/// Runtime environment backed by process variables.
#[derive(Clone, Default)]
pub struct RuntimeEnvironment {
    api_key: Option<String>,
}

impl RuntimeEnvironment {
    pub fn new(api_key: Option<String>) -> Self {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Self { api_key }
    }

    /// Read the key from `API_KEY`, then `GEMINI_API_KEY`.
    ///
    /// Logs an error when neither is set; construction still succeeds so the
    /// rest of the dashboard keeps working without the assistant.
    pub fn from_env() -> Self {
        let key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(FALLBACK_API_KEY_VAR).ok());
        let env = Self::new(key);
        if env.api_key.is_none() {
            error!("{} is missing from environment variables.", API_KEY_VAR);
        }
        env
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl std::fmt::Debug for RuntimeEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeEnvironment")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AiEnvironment for RuntimeEnvironment {
    fn api_key(&self) -> Result<String, EnvError> {
        self.api_key
            .clone()
            .ok_or_else(|| EnvError::MissingApiKey(PROVIDER_ID.to_string()))
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test environment for unit testing without process variables.
#[cfg(test)]
pub mod test_env {
    use super::*;

    /// Mock environment for testing.
    pub struct MockEnvironment {
        pub api_key: Option<String>,
        pub fixed_time: Option<DateTime<Utc>>,
    }

    impl MockEnvironment {
        pub fn new() -> Self {
            Self {
                api_key: Some("test-key".to_string()),
                fixed_time: None,
            }
        }

        pub fn without_api_key(mut self) -> Self {
            self.api_key = None;
            self
        }

        pub fn with_fixed_time(mut self, time: DateTime<Utc>) -> Self {
            self.fixed_time = Some(time);
            self
        }
    }

    impl Default for MockEnvironment {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AiEnvironment for MockEnvironment {
        fn api_key(&self) -> Result<String, EnvError> {
            self.api_key
                .clone()
                .ok_or_else(|| EnvError::MissingApiKey(PROVIDER_ID.to_string()))
        }

        fn now(&self) -> DateTime<Utc> {
            self.fixed_time.unwrap_or_else(Utc::now)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_environment_blank_key_is_missing() {
        let env = RuntimeEnvironment::new(Some("   ".to_string()));
        assert!(!env.has_api_key());
        assert!(matches!(env.api_key(), Err(EnvError::MissingApiKey(p)) if p == "gemini"));
    }

    #[test]
    fn test_runtime_environment_trims_key() {
        let env = RuntimeEnvironment::new(Some(" abc ".to_string()));
        assert_eq!(env.api_key().unwrap(), "abc");
        assert!(!format!("{:?}", env).contains("abc"));
    }
}
