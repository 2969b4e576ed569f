//! Generation configuration and its loader

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{
    error::{GenerationError, Result},
    schema::underscore_to_camel_case,
};

/// Largest accepted `indent` value
pub const MAX_INDENT: usize = 16;

/// Environment variable prefix, e.g. `SYMMETRIC_INDENT=4`
pub const ENV_PREFIX: &str = "SYMMETRIC";

/// Settings shared by every class and template in one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    /// Prepended to every output file name, exposed as `prefix`
    pub prefix: String,
    /// Spaces substituted for each tab after rendering; 0 keeps hard tabs
    pub indent: usize,
    /// Class names to skip
    pub exclude: Vec<String>,
    /// Expose property names in lowerCamelCase
    pub camelcase: bool,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            indent: 2,
            exclude: Vec::new(),
            camelcase: true,
        }
    }
}

impl CodegenConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file name and class prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the tab width
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Add a class name to skip
    pub fn with_exclude(mut self, class_name: impl Into<String>) -> Self {
        self.exclude.push(class_name.into());
        self
    }

    /// Whether `class_name` is excluded
    pub fn is_excluded(&self, class_name: &str) -> bool {
        self.exclude.iter().any(|name| name == class_name)
    }

    /// Name a property is exposed under in templates
    pub fn property_name(&self, name: &str) -> String {
        if self.camelcase {
            underscore_to_camel_case(name)
        } else {
            name.to_string()
        }
    }
}

/// Loads, validates and saves [`CodegenConfig`]
///
/// Values come from an optional TOML file, overridden by
/// `SYMMETRIC_`-prefixed environment variables.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    env_prefix: String,
}

impl ConfigManager {
    /// Create a manager reading the per-user config file
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Create a manager reading `path` instead of the per-user file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// `<config dir>/symmetric/codegen.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("symmetric")
            .join("codegen.toml")
    }

    /// File this manager reads and writes
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load and validate the configuration
    ///
    /// A missing file is not an error; defaults fill every unset field.
    pub fn load_config(&self) -> Result<CodegenConfig> {
        let builder = Config::builder()
            .add_source(File::from(self.config_path.clone()).required(false))
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("exclude"),
            );

        let config: CodegenConfig = builder.build()?.try_deserialize()?;
        self.validate_config(&config)?;
        Ok(config)
    }

    /// Write `config` as TOML, creating parent directories as needed
    pub fn save_config(&self, config: &CodegenConfig) -> Result<()> {
        self.validate_config(config)?;
        let toml = toml::to_string(config)?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, toml)?;
        Ok(())
    }

    /// Reject settings that would produce unusable output
    pub fn validate_config(&self, config: &CodegenConfig) -> Result<()> {
        if config.indent > MAX_INDENT {
            return Err(GenerationError::Validation(format!(
                "indent must be at most {}, got {}",
                MAX_INDENT, config.indent
            )));
        }
        if config.prefix.contains(['/', '\\']) {
            return Err(GenerationError::Validation(format!(
                "prefix `{}` must not contain path separators",
                config.prefix
            )));
        }
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
