//! Config file loading, error-message, and validation integration tests.
//! Storage: ~/.ardoq/config.yaml

use std::fs;

use ardoq_core::{config, ConfigError};
use assert_fs::prelude::*;
use predicates::prelude::predicate;

fn write_config(home: &assert_fs::TempDir, contents: &str) {
    fs::create_dir_all(home.path().join(".ardoq")).expect("mkdir");
    home.child(".ardoq/config.yaml").write_str(contents).expect("write");
}

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

#[test]
fn load_reads_all_fields() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    write_config(
        &home,
        "host: https://ardoq.internal\ntoken: secret-token\norg: acme\ntimeout_secs: 7\n",
    );

    let loaded = config::load_at(home.path()).expect("load");
    assert_eq!(loaded.host, "https://ardoq.internal");
    assert_eq!(loaded.token.as_deref(), Some("secret-token"));
    assert_eq!(loaded.org.as_deref(), Some("acme"));
    assert_eq!(loaded.timeout_secs, 7);
}

#[test]
fn partial_file_keeps_defaults_for_missing_keys() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    write_config(&home, "token: abc\n");

    let loaded = config::load_at(home.path()).expect("load");
    assert_eq!(loaded.host, config::DEFAULT_HOST);
    assert_eq!(loaded.timeout_secs, config::DEFAULT_TIMEOUT_SECS);
}

#[test]
fn empty_file_is_treated_as_defaults() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    write_config(&home, "");
    let loaded = config::load_at(home.path()).expect("load");
    assert_eq!(loaded, config::Config::default());
}

// ---------------------------------------------------------------------------
// 2. Error messages
// ---------------------------------------------------------------------------

#[test]
fn corrupt_yaml_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let dir = home.path().join(".ardoq");
    fs::create_dir_all(&dir).expect("mkdir");
    fs::write(dir.join("config.yaml"), b": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"), "must name the file, got: {err}");
}

#[test]
fn wrong_type_yaml_returns_parse_error() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    write_config(&home, "timeout_secs: soon\n");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

#[test]
fn missing_token_error_points_at_config_file() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let path = config::config_path_at(home.path());
    let err = config::Config::default().validate(&path).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("ARDOQ_API_TOKEN"), "got: {msg}");
    assert!(msg.contains("config.yaml"), "got: {msg}");
}

#[test]
fn config_path_lives_under_dot_ardoq() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    write_config(&home, "org: acme\n");
    home.child(".ardoq/config.yaml")
        .assert(predicate::path::exists());
    assert_eq!(
        config::config_path_at(home.path()),
        home.path().join(".ardoq").join("config.yaml")
    );
}

#[test]
fn home_not_found_error_message() {
    assert!(ConfigError::HomeNotFound.to_string().contains("home directory"));
}
