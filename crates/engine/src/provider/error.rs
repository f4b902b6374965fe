//! Error types for the generative text provider.

use thiserror::Error;

/// Errors that can occur when calling the text provider.
///
/// These never surface to engine callers; every provider failure is logged
/// and converted into a deterministic fallback path.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed (network error, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, for logs only.
        body: String,
    },

    /// Response body did not carry the expected candidate text payload.
    #[error("parse error: {0}")]
    Parse(String),
}
