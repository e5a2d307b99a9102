//! Transport error types.

use std::sync::Arc;

/// A network exchange that did not complete.
///
/// HTTP error statuses are completed exchanges and never show up here.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, TLS failure and similar.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// The configured transport timeout elapsed.
    #[error("request timeout")]
    Timeout,

    /// The body exceeded the configured size limit.
    #[error("response too large: {size} bytes exceeds {limit}")]
    TooLarge { size: usize, limit: usize },

    /// The body could not be read to completion.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// The request cannot be expressed to the HTTP client.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Simulated or host-reported loss of connectivity.
    #[error("offline")]
    Offline,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { FetchError::Timeout } else { FetchError::Network(Arc::new(err)) }
    }
}
