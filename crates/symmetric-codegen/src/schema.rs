//! Class descriptions and their render contexts

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use symmetric_template::{ast::is_identifier, Context, Mapping, Value};
use tracing::debug;

use crate::{
    config::CodegenConfig,
    error::{GenerationError, Result},
};

/// Property types that drive template decisions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    /// Text
    String,
    /// Whole number
    Integer,
    /// Decimal number
    Float,
    /// True or false
    Boolean,
    /// Calendar date
    Date,
    /// Date and time of day
    DateTime,
    /// Time of day
    Time,
    /// Reference to another class
    Reference,
    /// Any other type, named as written
    #[serde(untagged)]
    Other(String),
}

impl PropertyKind {
    /// Name exposed to templates as `kind`
    pub fn as_str(&self) -> &str {
        match self {
            PropertyKind::String => "string",
            PropertyKind::Integer => "integer",
            PropertyKind::Float => "float",
            PropertyKind::Boolean => "boolean",
            PropertyKind::Date => "date",
            PropertyKind::DateTime => "datetime",
            PropertyKind::Time => "time",
            PropertyKind::Reference => "reference",
            PropertyKind::Other(name) => name,
        }
    }

    /// Dates and datetimes, which need date handling in generated code
    pub fn is_date(&self) -> bool {
        matches!(self, PropertyKind::Date | PropertyKind::DateTime)
    }
}

/// One property of a class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    /// Property name as declared
    pub name: String,
    /// Property type
    #[serde(alias = "type")]
    pub kind: PropertyKind,
    /// Whether the property may be null
    #[serde(default)]
    pub nullable: bool,
    /// Default value, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Pre-rendered declaration line for the target language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<String>,
}

impl PropertySchema {
    /// Create a non-null property with no default
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            default: None,
            declaration: None,
        }
    }

    /// Set the declaration line
    pub fn with_declaration(mut self, declaration: impl Into<String>) -> Self {
        self.declaration = Some(declaration.into());
        self
    }

    /// Mark the property nullable
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Set the default value
    pub fn with_default(mut self, default: impl Into<serde_json::Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// One class to generate source files for
///
/// Keys not listed here are kept in `extra` and passed to templates as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassSchema {
    /// Class name, used in output file names
    pub name: String,
    /// Superclass name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_name: Option<String>,
    /// Name of the identifying property
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_field: Option<String>,
    /// Import lines
    #[serde(default)]
    pub imports: Vec<String>,
    /// Properties in declaration order
    #[serde(default)]
    pub properties: Vec<PropertySchema>,
    /// Pre-rendered method bodies
    #[serde(default)]
    pub methods: Vec<String>,
    /// Additional template values
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl ClassSchema {
    /// Create an empty class
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the superclass
    pub fn with_base(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = Some(base_name.into());
        self
    }

    /// Append a property
    pub fn with_property(mut self, property: PropertySchema) -> Self {
        self.properties.push(property);
        self
    }

    /// Set an extra template value
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Check the class can be named in code and file names
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(GenerationError::Validation(
                "class name must not be empty".to_string(),
            ));
        }
        if !is_identifier(&self.name) {
            return Err(GenerationError::Validation(format!(
                "class name `{}` is not an identifier",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for property in &self.properties {
            if !is_identifier(&property.name) {
                return Err(GenerationError::Validation(format!(
                    "property `{}` of `{}` is not an identifier",
                    property.name, self.name
                )));
            }
            if !seen.insert(property.name.as_str()) {
                return Err(GenerationError::Validation(format!(
                    "property `{}` is declared twice in `{}`",
                    property.name, self.name
                )));
            }
        }

        Ok(())
    }

    /// [`validate`](Self::validate), then check no two properties share a
    /// name once `config` has converted them
    pub fn validate_for(&self, config: &CodegenConfig) -> Result<()> {
        self.validate()?;

        let mut seen = HashMap::new();
        for property in &self.properties {
            let exposed = config.property_name(&property.name);
            if let Some(previous) = seen.insert(exposed.clone(), property.name.as_str()) {
                return Err(GenerationError::Validation(format!(
                    "properties `{}` and `{}` of `{}` are both exposed as `{}`",
                    previous, property.name, self.name, exposed
                )));
            }
        }

        Ok(())
    }

    /// Build the render context for this class
    pub fn to_context(&self, config: &CodegenConfig) -> Result<Context> {
        self.validate_for(config)?;

        let mut has_date = false;
        let mut has_bool = false;
        let mut datetime_fields = Vec::new();
        let mut properties = Vec::with_capacity(self.properties.len());
        let mut primary_field = self.primary_field.clone();

        for property in &self.properties {
            let name = config.property_name(&property.name);
            let name_upper = upper_first(&name);

            if property.kind.is_date() {
                has_date = true;
                datetime_fields.push(Value::from_iter([
                    ("name", name.clone()),
                    ("name_upper", name_upper.clone()),
                ]));
            } else if property.kind == PropertyKind::Boolean {
                has_bool = true;
            }
            if primary_field.is_none() && property.name == "id" {
                primary_field = Some(name.clone());
            }

            let mut entry = Mapping::new();
            entry.insert("name".to_string(), Value::from(name));
            entry.insert("name_upper".to_string(), Value::from(name_upper));
            entry.insert("kind".to_string(), Value::from(property.kind.as_str()));
            entry.insert("nullable".to_string(), Value::from(property.nullable));
            entry.insert("default".to_string(), Value::from(property.default.clone()));
            entry.insert(
                "declaration".to_string(),
                Value::from(property.declaration.clone()),
            );
            properties.push(Value::Mapping(entry));
        }

        let mut context = Context::new()
            .with("prefix", config.prefix.as_str())
            .with("name", self.name.as_str())
            .with("name_lower", lower_first(&self.name))
            .with("base_name", self.base_name.clone())
            .with("primary_field", primary_field)
            .with("imports", self.imports.clone())
            .with("methods", self.methods.clone())
            .with("properties", properties)
            .with("has_date", has_date)
            .with("has_bool", has_bool)
            .with("datetime_fields", datetime_fields);

        for (key, value) in &self.extra {
            if context.contains(key) {
                debug!(class = %self.name, key = %key, "extra value shadowed by computed key");
                continue;
            }
            context.insert(key.clone(), value.clone());
        }

        Ok(context)
    }
}

/// `snake_case` to lowerCamelCase, word by word
///
/// Every `_`-separated word is capitalized (first letter upper, rest lower),
/// then the first word is lowercased: `isHTML_enabled` gives `ishtmlEnabled`
/// and `_secret` gives `Secret`.
pub fn underscore_to_camel_case(name: &str) -> String {
    let mut words = name.split('_').map(capitalize);
    let first = words.next().unwrap_or_default().to_lowercase();
    words.fold(first, |mut camel, word| {
        camel.push_str(&word);
        camel
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Uppercase the first character, keep the rest
fn upper_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase the first character, keep the rest
fn lower_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
