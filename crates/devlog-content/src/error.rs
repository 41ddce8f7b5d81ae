//! Error types for devlog-content

use std::time::Duration;

use thiserror::Error;

/// Failures of the text-generation capability
///
/// These never leave [`ContentGenerator`](crate::ContentGenerator); they are
/// logged and replaced by fallback content.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Transport-level failure talking to the service
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No API key configured for a backend that needs one
    #[error("API key not configured")]
    MissingApiKey,

    /// Service rejected the credentials
    #[error("Authentication failed ({status})")]
    AuthenticationFailed {
        /// HTTP status code
        status: u16,
    },

    /// Service is rate limiting requests
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Non-success status not covered above
    #[error("Service responded with {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// Response could not be interpreted
    #[error("Malformed response: {message}")]
    MalformedResponse {
        /// What was wrong with it
        message: String,
    },

    /// Service answered with no usable text
    #[error("Empty response")]
    EmptyResponse,

    /// The call did not finish within the configured timeout
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}
