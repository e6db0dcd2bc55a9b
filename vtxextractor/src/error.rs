//! Error types for the yt-dlp adapter

use thiserror::Error;
use vtxsource::SourceError;

pub type Result<T> = std::result::Result<T, ExtractorError>;

#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The binary could not be started (missing, not executable)
    #[error("Failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// yt-dlp exited with a failure status
    #[error("yt-dlp failed (exit code {code:?}): {stderr}")]
    Exit { code: Option<i32>, stderr: String },

    /// stdout was not the expected JSON document
    #[error("Unparsable yt-dlp output: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// No progressive audio format in the info document
    #[error("No playable audio format for {0}")]
    NoAudio(String),
}

impl From<ExtractorError> for SourceError {
    fn from(err: ExtractorError) -> Self {
        match err {
            ExtractorError::NoAudio(_) => SourceError::no_stream(err.to_string()),
            other => SourceError::unavailable(other.to_string()),
        }
    }
}
