use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudioError {
    /// Missing API key or unusable settings. Never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Malformed image data: {0}")]
    MalformedImageData(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Non-2xx answer from the model API. `message` is the raw body text,
    /// which carries the vendor's status words ("UNAVAILABLE", ...).
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("No image in response")]
    NoImageInResponse,

    #[error("{0}")]
    TerminalGenerationFailure(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, StudioError>;
