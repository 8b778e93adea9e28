use thiserror::Error;

/// Errors that can occur when talking to the chat backend
#[derive(Debug, Error)]
pub enum ChatError {
    /// Network-level failure (connect, timeout, TLS, body read)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Response body was not the expected JSON shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configuration error (bad base URL, unbuildable client)
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Type alias for Results using ChatError
pub type Result<T> = std::result::Result<T, ChatError>;
