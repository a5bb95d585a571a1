//! Error types for the concierge provider.

use thiserror::Error;

/// Errors that can occur when asking the provider for a recommendation.
#[derive(Debug, Error)]
pub enum ConciergeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error.
    #[error("API error ({status}): {message}")]
    Api {
        /// Error status reported by the provider.
        status: String,
        /// Error message.
        message: String,
    },

    /// Rate limited by the provider.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),

    /// No provider is configured.
    #[error("concierge is offline")]
    Offline,
}
