//! Config error-message, init idempotency, and YAML round-trip tests.

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use rstest::rstest;
use std::fs;
use tinker_core::{
    config::{self, FetchErrorPolicy, SecretBackend},
    ConfigError, SizeVariant,
};

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_missing_config_mentions_init() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ConfigNotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("tinker init"));
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".tinker/config.yaml")
        .write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn load_bad_size_variant_is_parse_error() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".tinker/config.yaml")
        .write_str("frame:\n  size: q\n")
        .expect("write");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_default_config() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let (config, created) = config::init_at(home.path(), false).expect("init");
    assert!(created);
    assert_eq!(config.chat.model, "gpt-3.5-turbo");

    home.child(".tinker/config.yaml")
        .assert(predicate::str::contains("api_key_secret: OpenAIKey"));
    home.child(".tinker/config.yaml")
        .assert(predicate::str::contains("{dir}"));
}

#[test]
fn init_is_idempotent_without_force() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    config::init_at(home.path(), false).expect("first init");

    let path = config::path_at(home.path());
    let edited = fs::read_to_string(&path)
        .unwrap()
        .replace("gpt-3.5-turbo", "gpt-4o-mini");
    fs::write(&path, edited).unwrap();

    let (config, created) = config::init_at(home.path(), false).expect("second init");
    assert!(!created);
    assert_eq!(config.chat.model, "gpt-4o-mini");

    let (config, created) = config::init_at(home.path(), true).expect("forced init");
    assert!(created);
    assert_eq!(config.chat.model, "gpt-3.5-turbo");
}

// ---------------------------------------------------------------------------
// 3. Enum spellings
// ---------------------------------------------------------------------------

#[rstest]
#[case("env", SecretBackend::Env)]
#[case("file", SecretBackend::File)]
#[case("keyvault", SecretBackend::KeyVault)]
fn secret_backend_spellings(#[case] raw: &str, #[case] expected: SecretBackend) {
    let yaml = format!("secrets:\n  provider: {raw}\n");
    let config: config::Config = serde_yaml::from_str(&yaml).expect("parse");
    assert_eq!(config.secrets.provider, expected);
}

#[rstest]
#[case("abort", FetchErrorPolicy::Abort)]
#[case("skip", FetchErrorPolicy::Skip)]
fn fetch_policy_spellings(#[case] raw: &str, #[case] expected: FetchErrorPolicy) {
    let yaml = format!("frame:\n  on_fetch_error: {raw}\n  size: b\n");
    let config: config::Config = serde_yaml::from_str(&yaml).expect("parse");
    assert_eq!(config.frame.on_fetch_error, expected);
    assert_eq!(config.frame.size, SizeVariant::Large);
}
