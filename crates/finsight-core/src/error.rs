//! Error types for data operations.
//!
//! This module defines [`DataError`] which covers the failures that can occur
//! while configuring a provider or fetching and decoding upstream payloads.
//! Field-level problems (a non-numeric value, an unparseable date) are not
//! errors: they are represented as absent values.

use thiserror::Error;

/// Errors that can occur during data operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// Network-related errors (connection failures, timeouts, HTTP status).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The requested symbol was not found.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// Error parsing a response body.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Missing or invalid configuration, such as an absent API key.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Authentication failed for a provider.
    #[error("Authentication failed for provider {0}")]
    AuthenticationFailed(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl DataError {
    /// Returns true if this error should abort a whole batch rather than a
    /// single ticker.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;
