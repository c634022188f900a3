//! Error types for tinker-chat.

use thiserror::Error;

use tinker_core::SecretError;

/// All errors that can arise from a chat turn.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Network failure, non-success HTTP status, or an unusable response body.
    #[error("chat API request failed: {0}")]
    Upstream(String),

    /// The API answered HTTP 429.
    #[error("chat API rate limit exceeded: {0}")]
    RateLimited(String),

    /// The API key could not be resolved.
    #[error("secret error: {0}")]
    Secret(#[from] SecretError),

    /// Reading the prompt or writing the reply failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transcript dump serialization.
    #[error("transcript JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
