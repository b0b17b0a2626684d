use crate::error::{Result, SignerError};
use std::env;
use std::time::Duration;
use validator::Validate;

/// Connection settings for the signing service. Immutable once a client is
/// built from it.
#[derive(Debug, Clone, Validate)]
pub struct ApiConfig {
    /// Base URL of the signing API, without trailing slash
    #[validate(url(message = "API base must be an absolute URL"))]
    pub base_url: String,

    /// Static key sent as `x-api-key` on every signing-service request
    #[validate(length(min = 1, message = "API key must not be empty"))]
    pub api_key: String,

    /// Per-request timeout. `None` leaves it to the transport.
    pub request_timeout: Option<Duration>,

    /// User-Agent header for outgoing requests
    pub user_agent: String,
}

impl ApiConfig {
    /// Builds a config from raw operator input. Both values are trimmed and a
    /// trailing `/` is dropped from the base URL.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let api_key = api_key.trim().to_string();

        if base_url.is_empty() || api_key.is_empty() {
            return Err(SignerError::Config("Set API Base and API Key.".to_string()));
        }

        let config = Self {
            base_url,
            api_key,
            request_timeout: None,
            user_agent: default_user_agent(),
        };
        config.validate().map_err(|e| SignerError::Config(e.to_string()))?;
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Process-level settings, read from the environment
#[derive(Debug, Clone)]
pub struct SignerConfig {
    /// Signing API base URL (`SIGNING_API_BASE`)
    pub api_base: Option<String>,

    /// Signing API key (`SIGNING_API_KEY`)
    pub api_key: Option<String>,

    /// Request timeout in seconds (`SIGNING_REQUEST_TIMEOUT_SECS`, default: none)
    pub request_timeout_secs: Option<u64>,

    /// User-Agent override (`SIGNING_USER_AGENT`)
    pub user_agent: String,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            api_key: None,
            request_timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl SignerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            api_base: env::var("SIGNING_API_BASE").ok().or(default.api_base),

            api_key: env::var("SIGNING_API_KEY").ok().or(default.api_key),

            request_timeout_secs: env::var("SIGNING_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .or(default.request_timeout_secs),

            user_agent: env::var("SIGNING_USER_AGENT").unwrap_or(default.user_agent),
        }
    }

    /// Resolves the settings into a validated [`ApiConfig`].
    pub fn api_config(&self) -> Result<ApiConfig> {
        let base = self.api_base.as_deref().unwrap_or_default();
        let key = self.api_key.as_deref().unwrap_or_default();

        Ok(ApiConfig::new(base, key)?
            .with_timeout(self.request_timeout_secs.map(Duration::from_secs))
            .with_user_agent(self.user_agent.clone()))
    }
}
