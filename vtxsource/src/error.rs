//! Error types shared by the source adapters

use std::time::Duration;

/// Result type for source operations
pub type Result<T> = std::result::Result<T, SourceError>;

/// Failure of a single adapter (or of a single pool instance)
///
/// None of these ever reach the caller of the resolver: they are logged and
/// the next candidate is tried.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network error, bad status or malformed response from one upstream
    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    /// The upstream answered but offered nothing playable
    #[error("No playable stream: {0}")]
    NoStream(String),

    /// The catalog media pointer could not be decoded
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// An API credential could not be obtained
    #[error("Credential unavailable: {0}")]
    Credential(String),

    /// The adapter needs a title (and ideally an artist) to search with
    #[error("Missing search hints")]
    MissingHints,

    /// The adapter does not handle this kind of identifier
    #[error("Not applicable: {0}")]
    NotApplicable(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// A descriptor was about to be built without a media URL
    #[error("Empty upstream URL")]
    EmptyUrl,
}

impl SourceError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn no_stream(msg: impl Into<String>) -> Self {
        Self::NoStream(msg.into())
    }
}
