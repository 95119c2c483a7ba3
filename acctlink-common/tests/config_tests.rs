//! Configuration file resolution and graceful degradation
//!
//! Tests that touch ACCTLINK_CONFIG are marked #[serial] so they never race
//! on the process environment.

use acctlink_common::config::{
    resolve_config_path, AcctlinkConfig, DuplicatePolicy, CONFIG_ENV_VAR,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let config = AcctlinkConfig::load_or_default(&missing).unwrap();
    assert_eq!(config, AcctlinkConfig::default());
}

#[test]
fn test_load_full_file() {
    let file = write_config(
        r#"
        [linking]
        strip_prefixes = ["SO-"]
        strip_leading_zeros = false
        duplicate_opportunity_policy = "keep_last"
        orphan_warning_ratio = 0.1

        [metrics]
        deployment_success_threshold = 65

        [metrics.journey_weights]
        expectation = 0.5
        deployment = 0.3
        support = 0.2

        [logging]
        level = "debug"
        "#,
    );

    let config = AcctlinkConfig::load_or_default(file.path()).unwrap();
    assert_eq!(config.linking.strip_prefixes, vec!["SO-".to_string()]);
    assert!(!config.linking.strip_leading_zeros);
    assert!(config.linking.uppercase_keys);
    assert_eq!(
        config.linking.duplicate_opportunity_policy,
        DuplicatePolicy::KeepLast
    );
    assert_eq!(config.metrics.deployment_success_threshold, 65);
    assert_eq!(config.metrics.journey_weights.expectation, 0.5);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_invalid_file_is_reported_with_path() {
    let file = write_config(
        r#"
        [metrics]
        deployment_success_threshold = 101
        "#,
    );

    let err = AcctlinkConfig::load_or_default(file.path()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Configuration error"), "{}", message);
    assert!(message.contains("deployment_success_threshold"), "{}", message);
}

#[test]
#[serial]
fn test_cli_argument_wins_over_env() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_path(Some(Path::new("/tmp/from-cli.toml")));
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-cli.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_cli_argument() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_path(None);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-env.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_resolve_loads_env_file() {
    let file = write_config(
        r#"
        [metrics]
        deployment_success_threshold = 55
        "#,
    );
    env::set_var(CONFIG_ENV_VAR, file.path());

    let config = AcctlinkConfig::resolve(None).unwrap();
    assert_eq!(config.metrics.deployment_success_threshold, 55);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_resolve_with_missing_env_file_degrades() {
    env::set_var(CONFIG_ENV_VAR, "/nonexistent/acctlink/config.toml");

    let config = AcctlinkConfig::resolve(None).unwrap();
    assert_eq!(config, AcctlinkConfig::default());

    env::remove_var(CONFIG_ENV_VAR);
}
