//! Environment overrides for configuration
//!
//! Kept in its own test binary so no other test observes the variables.

use std::{env, fs};

use symmetric_codegen::ConfigManager;
use tempfile::TempDir;

/// Test that environment variables override the file
#[test]
fn test_environment_overrides_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("codegen.toml");
    fs::write(&path, "prefix = \"FILE\"\nindent = 2\n").unwrap();

    env::set_var("SYMMETRIC_INDENT", "4");
    env::set_var("SYMMETRIC_EXCLUDE", "Session,Token");
    let result = ConfigManager::with_path(&path).load_config();
    env::remove_var("SYMMETRIC_INDENT");
    env::remove_var("SYMMETRIC_EXCLUDE");

    let config = result.unwrap();
    assert_eq!(config.prefix, "FILE");
    assert_eq!(config.indent, 4);
    assert_eq!(config.exclude, vec!["Session", "Token"]);
}
