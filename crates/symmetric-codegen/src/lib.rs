#![warn(missing_docs)]

//! Source file generation from class descriptions
//!
//! Converts a [`ClassSchema`] into a template [`Context`](symmetric_template::Context)
//! and renders it through every registered template, producing one
//! [`GeneratedFile`] per template named `{prefix}{ClassName}.{extension}`.
//! Writing the files is left to the caller.

pub mod config;
pub mod error;
pub mod generator;
pub mod schema;

pub use config::{CodegenConfig, ConfigManager};
pub use error::{GenerationError, Result};
pub use generator::{GeneratedFile, Generator};
pub use schema::{underscore_to_camel_case, ClassSchema, PropertyKind, PropertySchema};
