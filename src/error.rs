//! Error types for crewmind

use thiserror::Error;

/// Result type alias for crewmind operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in crewmind
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio device error
    #[error("audio error: {0}")]
    Audio(String),

    /// Capture stopped before any audio was recorded
    #[error("no audio was captured before the stop signal")]
    EmptyRecording,

    /// Speech-to-text error
    #[error("transcription failed: {0}")]
    Transcription(String),

    /// Text-to-speech error
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    /// Chat-completion request error
    #[error("completion request failed: {0}")]
    Completion(String),

    /// The completion output contained no parseable summary object.
    /// Carries the raw response text for diagnosis; the session stays open.
    #[error("could not parse a summary object from completion output: {raw}")]
    SummaryParse {
        /// Raw completion text as received
        raw: String,
    },

    /// Operation attempted on a session in the wrong lifecycle state
    #[error("invalid session state: {0}")]
    InvalidState(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
