//! Configuration loading and store path resolution tests
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate PLANTAG_STORE are marked with #[serial].

use plantag_common::config::{
    default_store_path, load_toml_config, resolve_store_path, write_toml_config, LoggingConfig,
    TomlConfig, STORE_ENV_VAR,
};
use plantag_common::Error;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_missing_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = load_toml_config(&temp_dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_partial_file_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("plantag.toml");
    std::fs::write(&path, "workers = 8\n[logging]\nlevel = \"debug\"\n").unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.workers, 8);
    assert_eq!(config.flush_every, 500);
    assert_eq!(config.default_discipline, "ME");
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.ansi);
}

#[test]
fn test_invalid_values_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("plantag.toml");
    std::fs::write(&path, "flush_every = 0\n").unwrap();

    assert!(matches!(load_toml_config(&path), Err(Error::Config(_))));
}

#[test]
fn test_malformed_toml_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("plantag.toml");
    std::fs::write(&path, "workers = [unterminated").unwrap();

    assert!(matches!(load_toml_config(&path), Err(Error::Config(_))));
}

#[test]
fn test_atomic_write_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("nested").join("plantag.toml");

    let config = TomlConfig {
        store_path: Some(PathBuf::from("/data/store.json")),
        codification_file: Some(PathBuf::from("/data/codes.toml")),
        flush_every: 50,
        workers: 2,
        default_discipline: "EL".to_string(),
        default_entity: "CBL".to_string(),
        logging: LoggingConfig {
            level: "warn".to_string(),
            ansi: false,
        },
    };

    write_toml_config(&config, &target).unwrap();

    // Temp file cleaned up, target readable
    assert!(target.exists());
    assert!(!temp_dir.path().join("nested").join("plantag.toml.tmp").exists());
    assert_eq!(load_toml_config(&target).unwrap(), config);
}

#[test]
#[serial]
fn test_cli_argument_wins() {
    env::set_var(STORE_ENV_VAR, "/tmp/from-env.json");
    let config = TomlConfig {
        store_path: Some(PathBuf::from("/tmp/from-toml.json")),
        ..Default::default()
    };

    let path = resolve_store_path(Some("/tmp/from-cli.json"), STORE_ENV_VAR, Some(&config));
    assert_eq!(path, PathBuf::from("/tmp/from-cli.json"));
    env::remove_var(STORE_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_beats_toml() {
    env::set_var(STORE_ENV_VAR, "/tmp/from-env.json");
    let config = TomlConfig {
        store_path: Some(PathBuf::from("/tmp/from-toml.json")),
        ..Default::default()
    };

    let path = resolve_store_path(None, STORE_ENV_VAR, Some(&config));
    assert_eq!(path, PathBuf::from("/tmp/from-env.json"));
    env::remove_var(STORE_ENV_VAR);
}

#[test]
#[serial]
fn test_toml_then_default() {
    env::remove_var(STORE_ENV_VAR);
    let config = TomlConfig {
        store_path: Some(PathBuf::from("/tmp/from-toml.json")),
        ..Default::default()
    };

    assert_eq!(
        resolve_store_path(None, STORE_ENV_VAR, Some(&config)),
        PathBuf::from("/tmp/from-toml.json")
    );
    assert_eq!(resolve_store_path(None, STORE_ENV_VAR, None), default_store_path());
}
