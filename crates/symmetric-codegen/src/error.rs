//! Error types for class generation

use symmetric_template::{CompileError, ContextError, RenderError};
use thiserror::Error;

/// Generation result type
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Errors that can occur while configuring or running generation
#[derive(Debug, Error)]
pub enum GenerationError {
    /// A template failed to compile
    #[error("Template `{template}` failed to compile: {source}")]
    Compile {
        /// Name the template was registered under
        template: String,
        /// Underlying compile error
        source: CompileError,
    },

    /// A template failed to render for a class
    #[error("Template `{template}` failed to render for class `{class_name}`: {source}")]
    Render {
        /// Name the template was registered under
        template: String,
        /// Class being rendered
        class_name: String,
        /// Underlying render error
        source: RenderError,
    },

    /// Building a render context failed
    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    /// Loading configuration failed
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing configuration as TOML failed
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Schema or configuration validation failed
    #[error("Validation failed: {0}")]
    Validation(String),
}
