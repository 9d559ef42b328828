//! Error types for the NextDNS reconciliation core
//!
//! Remote failures, local validation failures and orchestrator-state
//! failures share one enum so every lifecycle call can surface a single
//! wrapped diagnostic.

use thiserror::Error;

/// Result type alias for reconciliation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (missing API key, bad URL, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A declarative field is missing or malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transport-level HTTP failures
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Remote object not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote API rejected the request
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Orchestrator state store errors
    #[error("State store error: {0}")]
    StateStore(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error wrapped with the operation that produced it
    #[error("{context}: {source}")]
    Context {
        /// Operation message, e.g. "error creating allow list"
        context: String,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a local validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Wrap this error with an operation message
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any context wrappers
    pub fn root(&self) -> &Error {
        match self {
            Error::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the remote service reported the object as absent
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Error::NotFound(_))
    }

    /// Whether this is a local validation failure rather than a remote one
    pub fn is_validation(&self) -> bool {
        matches!(self.root(), Error::Validation(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

/// Attach an operation message to a failed result
pub trait ResultExt<T> {
    /// Wrap the error, if any, with `context`
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_message_prefixes_source() {
        let err = Error::http("connection reset").context("error creating allow list");
        assert_eq!(
            err.to_string(),
            "error creating allow list: HTTP error: connection reset"
        );
    }

    #[test]
    fn not_found_is_seen_through_wrappers() {
        let err = Error::not_found("profile abc123")
            .context("error getting profile")
            .context("error importing profile");
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }

    #[test]
    fn result_ext_wraps_only_errors() {
        let ok: Result<u32> = Ok(7);
        assert_eq!(ok.context("unused").unwrap(), 7);

        let failed: Result<u32> = Err(Error::validation("domain is required"));
        let err = failed.context("error building deny list").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().starts_with("error building deny list"));
    }
}
