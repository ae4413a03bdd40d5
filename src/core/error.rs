//! Error handling - hierarchical errors for the ticker pipeline

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Tickwatch error hierarchy
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// WebSocket errors (connection lost or never established)
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// The raw batch payload could not be decoded at all
    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// A single entry inside an otherwise decodable payload is unusable
    #[error("Invalid tick at entry {index}: {reason}")]
    InvalidTick { index: usize, reason: String },
}
