//! Errors surfaced by the stdio host.

/// Failures of the event loop itself.
///
/// Handler failures never show up here; they end in a fallback response
/// or a log line.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// An input line is not a recognized event.
    #[error("MALFORMED_EVENT: {0}")]
    MalformedEvent(String),

    /// An output record could not be encoded.
    #[error("ENCODE_FAILED: {0}")]
    Encode(#[from] serde_json::Error),

    /// Reading events or writing records failed.
    #[error("IO_ERROR: {0}")]
    Io(#[from] std::io::Error),
}
