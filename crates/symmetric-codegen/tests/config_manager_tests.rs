//! Integration tests for loading and saving configuration files

use std::fs;

use symmetric_codegen::{CodegenConfig, ConfigManager, GenerationError};
use tempfile::TempDir;

/// Test that a missing file yields the defaults
#[test]
fn test_missing_file_loads_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_path(temp_dir.path().join("absent.toml"));
    let config = manager.load_config().unwrap();
    assert_eq!(config.indent, 2);
    assert!(config.camelcase);
}

/// Test save then load through a nested directory
#[test]
fn test_save_and_load_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("codegen.toml");
    let manager = ConfigManager::with_path(&path);

    let config = CodegenConfig::new()
        .with_prefix("SB")
        .with_indent(4)
        .with_exclude("Session");
    manager.save_config(&config).unwrap();
    assert!(path.exists());

    assert_eq!(manager.load_config().unwrap(), config);
}

/// Test loading a hand-written file with some fields omitted
#[test]
fn test_load_partial_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("codegen.toml");
    fs::write(&path, "indent = 0\ncamelcase = false\n").unwrap();

    let config = ConfigManager::with_path(&path).load_config().unwrap();
    assert_eq!(config.indent, 0);
    assert!(!config.camelcase);
    assert_eq!(config.prefix, "");
}

/// Test that invalid files are rejected on load
#[test]
fn test_load_rejects_invalid_indent() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("codegen.toml");
    fs::write(&path, "indent = 40\n").unwrap();

    let err = ConfigManager::with_path(&path).load_config().unwrap_err();
    assert!(matches!(err, GenerationError::Validation(_)));
}

/// Test that malformed TOML surfaces as a configuration error
#[test]
fn test_load_malformed_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("codegen.toml");
    fs::write(&path, "indent = [").unwrap();

    let err = ConfigManager::with_path(&path).load_config().unwrap_err();
    assert!(matches!(err, GenerationError::Config(_)));
}

/// Test that invalid settings are never written
#[test]
fn test_save_rejects_invalid_prefix() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("codegen.toml");
    let manager = ConfigManager::with_path(&path);

    assert!(manager.save_config(&CodegenConfig::new().with_prefix("a/b")).is_err());
    assert!(!path.exists());
}
