//! tinker core library — domain types, YAML config, secret providers, errors.
//!
//! - [`types`] — chat messages and remote photo metadata
//! - [`error`] — [`ConfigError`], [`SecretError`]
//! - [`config`] — load / save / init of `~/.tinker/config.yaml`
//! - [`secrets`] — [`SecretProvider`] and its env / file / Key Vault backends

pub mod config;
pub mod error;
pub mod secrets;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::Config;
pub use error::{ConfigError, SecretError};
pub use secrets::SecretProvider;
pub use types::{Message, RemoteItem, Role, SizeVariant};
