//! Error types for tinker-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None` — cannot locate `~/.tinker/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The config YAML file did not exist at the expected path.
    #[error("config not found at {path}; run `tinker init` first")]
    ConfigNotFound { path: PathBuf },
}

/// Failures of a secret provider.
#[derive(Debug, Error)]
pub enum SecretError {
    /// The store answered, but has no secret under this name.
    #[error("secret '{name}' not found")]
    NotFound { name: String },

    /// The store refused the caller's credentials.
    #[error("not authorized to read secret '{name}': {reason}")]
    Auth { name: String, reason: String },

    /// The store could not be reached or answered with garbage.
    #[error("secret store request failed: {0}")]
    Transport(String),

    /// Reading a local secrets file failed.
    #[error("failed to read secrets file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The local secrets file is not a `name: value` YAML map.
    #[error("failed to parse secrets file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
