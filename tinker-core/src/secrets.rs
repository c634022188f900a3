//! Secret providers.
//!
//! Config files only ever name a secret (`api_key_secret: OpenAIKey`); a
//! [`SecretProvider`] built from [`SecretsConfig`] turns that name into the
//! value at the moment a client is constructed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::config::{tinker_dir_at, SecretBackend, SecretsConfig};
use crate::error::SecretError;

/// Env var holding the bearer token for [`KeyVaultSecrets`].
pub const KEYVAULT_TOKEN_ENV: &str = "AZURE_KEYVAULT_TOKEN";

/// Key Vault REST API version.
const KEYVAULT_API_VERSION: &str = "7.4";

/// Resolves a secret name to its value.
pub trait SecretProvider {
    fn get_secret(&self, name: &str) -> Result<String, SecretError>;
}

/// Build the provider selected in config.
pub fn provider_from_config(
    config: &SecretsConfig,
    home: &Path,
) -> Result<Box<dyn SecretProvider>, SecretError> {
    match config.provider {
        SecretBackend::Env => Ok(Box::new(EnvSecrets)),
        SecretBackend::File => {
            let path = config
                .file
                .clone()
                .unwrap_or_else(|| tinker_dir_at(home).join("secrets.yaml"));
            Ok(Box::new(FileSecrets::new(path)))
        }
        SecretBackend::KeyVault => {
            let vault_url = config.vault_url.clone().ok_or_else(|| {
                SecretError::Transport("secrets.vault_url is required for keyvault".to_string())
            })?;
            Ok(Box::new(KeyVaultSecrets::from_env(vault_url)))
        }
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Reads `TINKER_SECRET_<NAME>`; see [`env_var_name`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecrets;

/// `OpenAIKey` → `TINKER_SECRET_OPENAIKEY`, `flickr-key` → `TINKER_SECRET_FLICKR_KEY`.
pub fn env_var_name(name: &str) -> String {
    let upper: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("TINKER_SECRET_{upper}")
}

impl SecretProvider for EnvSecrets {
    fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        match std::env::var(env_var_name(name)) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Err(SecretError::NotFound {
                name: name.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// A `name: value` YAML map on disk, read on every lookup.
#[derive(Debug, Clone)]
pub struct FileSecrets {
    path: PathBuf,
}

impl FileSecrets {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SecretProvider for FileSecrets {
    fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        if !self.path.exists() {
            return Err(SecretError::NotFound {
                name: name.to_string(),
            });
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|source| SecretError::Io {
            path: self.path.clone(),
            source,
        })?;
        let secrets: HashMap<String, String> =
            serde_yaml::from_str(&contents).map_err(|source| SecretError::Parse {
                path: self.path.clone(),
                source,
            })?;
        secrets
            .get(name)
            .cloned()
            .ok_or_else(|| SecretError::NotFound {
                name: name.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Key Vault
// ---------------------------------------------------------------------------

/// Azure Key Vault `GET /secrets/{name}`.
///
/// The bearer token is supplied from outside; no token acquisition happens here.
pub struct KeyVaultSecrets {
    vault_url: String,
    token: Option<String>,
    agent: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct SecretBundle {
    value: String,
}

impl KeyVaultSecrets {
    pub fn new(vault_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Self {
        Self {
            vault_url: vault_url.into().trim_end_matches('/').to_string(),
            token,
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    /// Token from [`KEYVAULT_TOKEN_ENV`], 30 second timeout.
    pub fn from_env(vault_url: impl Into<String>) -> Self {
        let token = std::env::var(KEYVAULT_TOKEN_ENV).ok().filter(|t| !t.is_empty());
        Self::new(vault_url, token, Duration::from_secs(30))
    }
}

impl SecretProvider for KeyVaultSecrets {
    fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        let token = self.token.as_deref().ok_or_else(|| SecretError::Auth {
            name: name.to_string(),
            reason: format!("{KEYVAULT_TOKEN_ENV} is not set"),
        })?;

        let url = format!("{}/secrets/{}", self.vault_url, name);
        let response = self
            .agent
            .get(&url)
            .query("api-version", KEYVAULT_API_VERSION)
            .set("Authorization", &format!("Bearer {token}"))
            .call();

        match response {
            Ok(response) => {
                let bundle: SecretBundle = response
                    .into_json()
                    .map_err(|e| SecretError::Transport(format!("invalid secret payload: {e}")))?;
                Ok(bundle.value)
            }
            Err(ureq::Error::Status(404, _)) => Err(SecretError::NotFound {
                name: name.to_string(),
            }),
            Err(ureq::Error::Status(code @ (401 | 403), _)) => Err(SecretError::Auth {
                name: name.to_string(),
                reason: format!("vault answered HTTP {code}"),
            }),
            Err(ureq::Error::Status(code, _)) => {
                Err(SecretError::Transport(format!("vault answered HTTP {code}")))
            }
            Err(ureq::Error::Transport(t)) => Err(SecretError::Transport(t.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
