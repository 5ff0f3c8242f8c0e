use std::env;
use std::fmt;

use crate::error::RelayError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection settings for the upstream completion API, resolved once at
/// startup and injected into the handler state.
#[derive(Clone)]
pub struct RelayConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl RelayConfig {
    /// Reads the configuration from the environment.
    ///
    /// The credential is required and validated here so that a misconfigured
    /// process refuses to start instead of failing on every request.
    pub fn from_env() -> Result<Self, RelayError> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| RelayError::Configuration("OPENAI_API_KEY is not set".to_string()))?;
        if api_key.trim().is_empty() {
            return Err(RelayError::Configuration(
                "OPENAI_API_KEY is empty".to_string(),
            ));
        }

        let base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key,
            base_url,
            model,
        })
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}
