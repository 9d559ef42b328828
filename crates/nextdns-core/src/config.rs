//! Configuration types for the NextDNS client
//!
//! The orchestrator hands the plugin a single provider block. Only the API
//! key is mandatory; it may also come from the `NEXTDNS_API_KEY`
//! environment variable.

use serde::{Deserialize, Serialize};

/// Environment variable consulted when no API key is configured explicitly
pub const API_KEY_ENV: &str = "NEXTDNS_API_KEY";

/// Public NextDNS API endpoint
pub const DEFAULT_API_URL: &str = "https://api.nextdns.io";

/// Provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// NextDNS API key
    /// ⚠️ NEVER log this value
    pub api_key: String,

    /// Base URL of the configuration API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout (in seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<REDACTED>")
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a configuration with default endpoint and timeout
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Resolve the API key the way the provider block does
    ///
    /// An explicit, non-empty key wins; otherwise `NEXTDNS_API_KEY` is used.
    pub fn resolve(explicit_key: Option<&str>) -> Result<Self, crate::Error> {
        let api_key = match explicit_key {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => std::env::var(API_KEY_ENV).unwrap_or_default(),
        };

        let config = Self::new(api_key);
        config.validate()?;
        Ok(config)
    }

    /// Set the API base URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_key.is_empty() {
            return Err(crate::Error::config(format!(
                "NextDNS API key must be provided in the provider block or {} environment variable.",
                API_KEY_ENV
            )));
        }

        if !self.api_url.starts_with("https://") && !self.api_url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "API URL must use HTTP or HTTPS scheme. Got: {}",
                self.api_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Request timeout must be > 0"));
        }

        Ok(())
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
