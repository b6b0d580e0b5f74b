//! Client configuration.

use std::time::Duration;

use crate::ApiError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default API location, matching the development gateway's listen address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3456";

/// Connection settings for [`HttpModerationApi`](crate::HttpModerationApi).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ClientConfig {
    /// Scheme, host and optional path prefix, without a trailing slash.
    pub base_url: String,

    /// Bearer token of the signed-in user, if any.
    pub token: Option<String>,

    /// Upper bound on a single request, including reading the body.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a config for `base_url` with no token and the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { base_url, token: None, timeout: DEFAULT_TIMEOUT }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read the config from the environment.
    ///
    /// - `ALGOMARKET_API_URL` (default [`DEFAULT_BASE_URL`])
    /// - `ALGOMARKET_API_TOKEN` (optional)
    /// - `ALGOMARKET_TIMEOUT_SECS` (default 30)
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidConfig`] if the timeout is not a positive integer.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let mut config =
            Self::new(lookup("ALGOMARKET_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()));
        if let Some(token) = lookup("ALGOMARKET_API_TOKEN").filter(|t| !t.is_empty()) {
            config.token = Some(token);
        }
        if let Some(raw) = lookup("ALGOMARKET_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| {
                    ApiError::InvalidConfig(format!("ALGOMARKET_TIMEOUT_SECS must be a positive integer, got '{raw}'"))
                })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
