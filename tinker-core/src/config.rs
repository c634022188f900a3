//! YAML configuration for both tools.
//!
//! # Storage layout
//!
//! ```text
//! ~/.tinker/
//!   config.yaml     (mode 0600, created by `tinker init`)
//!   secrets.yaml    (optional, read by the `file` secret provider)
//!   photos/         (default mirror directory)
//!   run/            (slideshow pid file)
//! ```
//!
//! # API pattern
//!
//! Every function has two forms:
//! - `fn_at(home: &Path, …)` — explicit home; used in tests with `TempDir`
//! - `fn(…)` — derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::SizeVariant;

// ---------------------------------------------------------------------------
// 1. Config model
// ---------------------------------------------------------------------------

/// Root of `~/.tinker/config.yaml`. Every section falls back to its defaults,
/// so a partial file loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub secrets: SecretsConfig,
    pub chat: ChatConfig,
    pub frame: FrameConfig,
    pub slideshow: SlideshowConfig,
}

/// Which secret store resolves names like `OpenAIKey`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SecretBackend {
    /// `TINKER_SECRET_<NAME>` environment variables.
    #[default]
    Env,
    /// A local `name: value` YAML file.
    File,
    /// Azure Key Vault REST API.
    KeyVault,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SecretsConfig {
    pub provider: SecretBackend,
    /// Vault base URL, e.g. `https://labsecrets.vault.azure.net`.
    pub vault_url: Option<String>,
    /// Secrets file for the `file` provider; defaults to `~/.tinker/secrets.yaml`.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub model: String,
    pub api_base: String,
    /// Secret name holding the API key.
    pub api_key_secret: String,
    pub system_prompt: String,
    /// Label printed in front of each reply.
    pub assistant_label: String,
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            api_key_secret: "OpenAIKey".to_string(),
            system_prompt: "You are a helpful but cranky assistant.".to_string(),
            assistant_label: "ChatGPT".to_string(),
            timeout_secs: 60,
        }
    }
}

/// What a sync pass does when one download fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FetchErrorPolicy {
    /// Stop the pass and surface the error.
    #[default]
    Abort,
    /// Log, record the failure, keep going.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub api_base: String,
    /// Secret name holding the photo service API key.
    pub api_key_secret: String,
    pub photoset_id: String,
    pub user_id: Option<String>,
    /// Local mirror directory. A leading `~` expands to the home directory.
    pub photos_dir: PathBuf,
    pub size: SizeVariant,
    pub on_fetch_error: FetchErrorPolicy,
    pub timeout_secs: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.flickr.com/services/rest".to_string(),
            api_key_secret: "FlickrKey".to_string(),
            photoset_id: String::new(),
            user_id: None,
            photos_dir: PathBuf::from("~/.tinker/photos"),
            size: SizeVariant::default(),
            on_fetch_error: FetchErrorPolicy::default(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideshowConfig {
    pub program: String,
    /// Arguments; `{dir}` is replaced by the photo directory.
    pub args: Vec<String>,
    /// Launch in the background and remember the pid, instead of waiting.
    pub detach: bool,
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            program: "feh".to_string(),
            args: [
                "--quiet",
                "--fullscreen",
                "--randomize",
                "--slideshow-delay",
                "10",
                "{dir}",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            detach: true,
        }
    }
}

impl FrameConfig {
    /// `photos_dir` with a leading `~` resolved against `home`.
    pub fn photos_dir_at(&self, home: &Path) -> PathBuf {
        expand_home(&self.photos_dir, home)
    }
}

// ---------------------------------------------------------------------------
// 2. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.tinker/`
pub fn tinker_dir_at(home: &Path) -> PathBuf {
    home.join(".tinker")
}

/// `<home>/.tinker/config.yaml` — pure, no I/O.
pub fn path_at(home: &Path) -> PathBuf {
    tinker_dir_at(home).join("config.yaml")
}

/// Expand a leading `~` component against `home`.
pub fn expand_home(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Load `<home>/.tinker/config.yaml`.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = path_at(home);
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// 4. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save the config to `<home>/.tinker/config.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &Config) -> Result<(), ConfigError> {
    let dir = tinker_dir_at(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    let path = path_at(home);
    let tmp_path = path.with_file_name("config.yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    save_at(&home()?, config)
}

// ---------------------------------------------------------------------------
// 5. Init
// ---------------------------------------------------------------------------

/// Write the default config unless one exists.
///
/// Idempotent: if the file already exists and `force` is false, loads and
/// returns it unchanged. Returns `(config, created)`.
pub fn init_at(home: &Path, force: bool) -> Result<(Config, bool), ConfigError> {
    if path_at(home).exists() && !force {
        return Ok((load_at(home)?, false));
    }
    let config = Config::default();
    save_at(home, &config)?;
    Ok((config, true))
}

/// `init_at` convenience wrapper.
pub fn init(force: bool) -> Result<(Config, bool), ConfigError> {
    init_at(&home()?, force)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Home directory from the environment.
pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
