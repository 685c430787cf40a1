//! Error types for the Classpoll client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The server answered an HTTP call with a non-success status
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    /// A line typed at the prompt could not be understood
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
