//! Error types for the instance pools

use vtxsource::SourceError;

/// Result type alias for pool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while querying one instance
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The instance answered with an error status
    #[error("Instance {instance} returned status {status}")]
    Status { instance: String, status: u16 },

    /// The instance answered with an error document
    #[error("Instance {instance} error: {message}")]
    Api { instance: String, message: String },

    /// The response had no audio-only format with a URL
    #[error("No audio format offered by {0}")]
    NoAudio(String),
}

impl From<Error> for SourceError {
    fn from(err: Error) -> Self {
        match err {
            Error::NoAudio(instance) => {
                SourceError::no_stream(format!("no audio format offered by {}", instance))
            }
            other => SourceError::unavailable(other.to_string()),
        }
    }
}
