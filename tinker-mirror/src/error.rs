//! Error types for tinker-mirror.

use std::path::PathBuf;

use thiserror::Error;

use tinker_core::SecretError;

/// All errors that can arise from a sync pass.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The photo service rejected the API key or the caller.
    #[error("photo service refused the request: {0}")]
    Auth(String),

    /// The album does not exist (or is not visible to this key).
    #[error("album not found: {0}")]
    NotFound(String),

    /// Transport failure, unexpected HTTP status, or an unusable response.
    #[error("network error: {0}")]
    Network(String),

    /// A local filesystem operation failed, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The photo service API key could not be resolved.
    #[error("secret error: {0}")]
    Secret(#[from] SecretError),
}

/// Convenience constructor for [`MirrorError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> MirrorError {
    MirrorError::Io {
        path: path.into(),
        source,
    }
}
