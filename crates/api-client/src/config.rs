//! Configuration for the medrec API client
//!
//! Values come from, in increasing priority: built-in defaults, the TOML
//! configuration file, and environment variables.

use crate::error::{ApiError, ApiResult};
use medrec_core::config::ApiConfig;
use std::env;
use std::time::Duration;

/// Default backend URL for local development
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default lifetime of a login session
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every request path is appended to
    pub base_url: String,
    /// Request timeout. `None` means requests wait for the backend indefinitely.
    pub timeout: Option<Duration>,
    /// How long a session stays valid after login
    pub session_ttl: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: None,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `MEDREC_API_URL`: Base URL of the backend
    /// - `MEDREC_TIMEOUT_SECS`: Request timeout in seconds
    /// - `MEDREC_SESSION_TTL_SECS`: Session lifetime in seconds
    pub fn from_env() -> ApiResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Build from the `[api]` section of the configuration file, then apply
    /// environment overrides
    pub fn from_file_config(api: &ApiConfig) -> ApiResult<Self> {
        let mut config = Self {
            base_url: api
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout: api.timeout_secs.map(Duration::from_secs),
            session_ttl: Duration::from_secs(api.session_ttl_secs),
        };
        config = config.with_env_overrides()?;
        Ok(config)
    }

    fn with_env_overrides(mut self) -> ApiResult<Self> {
        if let Ok(url) = env::var("MEDREC_API_URL") {
            self.base_url = url;
        }

        if let Ok(raw) = env::var("MEDREC_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                ApiError::config(format!("MEDREC_TIMEOUT_SECS is not a number: {raw}"))
            })?;
            self.timeout = Some(Duration::from_secs(secs));
        }

        if let Ok(raw) = env::var("MEDREC_SESSION_TTL_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                ApiError::config(format!("MEDREC_SESSION_TTL_SECS is not a number: {raw}"))
            })?;
            self.session_ttl = Duration::from_secs(secs);
        }

        Ok(self)
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builder-style method to set session lifetime
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::config("base_url must start with http:// or https://"));
        }

        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        if self.session_ttl.is_zero() {
            return Err(ApiError::config("session_ttl cannot be zero"));
        }

        Ok(())
    }
}
