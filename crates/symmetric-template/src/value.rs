//! Render-time data model
//!
//! Values form a closed tree: scalars, sequences, ordered mappings, and an
//! explicit `Absent` for anything that could not be found. Lookups never fail;
//! a missing name or an attribute access on the wrong kind of value yields
//! `Absent`.

use std::borrow::Cow;

use indexmap::IndexMap;
use serde::Serialize;

use crate::{ast::Path, error::ContextError};

/// Ordered name to value mapping
pub type Mapping = IndexMap<String, Value>;

/// A value available to templates
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Nothing was found
    #[default]
    Absent,
    /// Text scalar
    String(String),
    /// Integer scalar
    Integer(i64),
    /// Floating point scalar
    Float(f64),
    /// Boolean scalar
    Bool(bool),
    /// Ordered list, iterable with `for`
    Sequence(Vec<Value>),
    /// Nested mapping, addressable with dotted paths
    Mapping(Mapping),
}

impl Value {
    /// Short name of the variant, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    /// Truthiness as used by `{% if %}`
    ///
    /// Absent, empty strings, empty sequences, `false` and numeric zero are
    /// falsy. Everything else, empty mappings included, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Absent => false,
            Value::String(s) => !s.is_empty(),
            Value::Integer(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Bool(b) => *b,
            Value::Sequence(items) => !items.is_empty(),
            Value::Mapping(_) => true,
        }
    }

    /// Text form used for `{{ }}` output
    ///
    /// Sequences and mappings have no text form and render as empty.
    pub fn to_output(&self) -> Cow<'_, str> {
        match self {
            Value::String(s) => Cow::Borrowed(s.as_str()),
            Value::Integer(n) => Cow::Owned(n.to_string()),
            Value::Float(n) => Cow::Owned(n.to_string()),
            Value::Bool(true) => Cow::Borrowed("true"),
            Value::Bool(false) => Cow::Borrowed("false"),
            Value::Absent | Value::Sequence(_) | Value::Mapping(_) => Cow::Borrowed(""),
        }
    }

    /// Child value for one path segment
    ///
    /// Name segments index mappings, numeric segments index sequences.
    pub fn attr(&self, segment: &str) -> Option<&Value> {
        match self {
            Value::Mapping(map) => map.get(segment),
            Value::Sequence(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Follow a list of segments from this value
    pub fn lookup_segments(&self, segments: &[String]) -> Option<&Value> {
        segments
            .iter()
            .try_fold(self, |value, segment| value.attr(segment))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Integer(i64::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        match i64::try_from(value) {
            Ok(n) => Value::Integer(n),
            Err(_) => Value::Float(value as f64),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Absent)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Sequence(values.into_iter().map(Into::into).collect())
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Mapping(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Absent,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Mapping(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Root mapping a template is rendered against
///
/// Rendering only ever reads from the context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    root: Mapping,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from any value that serializes to a mapping
    pub fn from_serialize<T: Serialize + ?Sized>(data: &T) -> Result<Self, ContextError> {
        match Value::from(serde_json::to_value(data)?) {
            Value::Mapping(root) => Ok(Self { root }),
            other => Err(ContextError::NotAMapping {
                found: other.kind(),
            }),
        }
    }

    /// Set a top-level entry, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.root.insert(name.into(), value.into());
    }

    /// Builder form of [`Context::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Top-level entry by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.root.get(name)
    }

    /// Whether a top-level entry exists
    pub fn contains(&self, name: &str) -> bool {
        self.root.contains_key(name)
    }

    /// Resolve a dotted path from the root, `None` when any segment is missing
    pub fn lookup(&self, path: &Path) -> Option<&Value> {
        self.get(path.head())
            .and_then(|value| value.lookup_segments(path.rest()))
    }

    /// The root mapping
    pub fn as_mapping(&self) -> &Mapping {
        &self.root
    }

    /// Number of top-level entries
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Whether there are no top-level entries
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

impl From<Mapping> for Context {
    fn from(root: Mapping) -> Self {
        Self { root }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            root: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Context {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Absent.is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from(0.0).is_truthy());
        assert!(!Value::from(false).is_truthy());
        assert!(!Value::Sequence(vec![]).is_truthy());

        assert!(Value::from("0").is_truthy());
        assert!(Value::from(-1).is_truthy());
        assert!(Value::from(true).is_truthy());
        assert!(Value::from(vec!["a"]).is_truthy());
        assert!(Value::Mapping(Mapping::new()).is_truthy());
    }

    #[test]
    fn test_output_text() {
        assert_eq!(Value::from("x").to_output(), "x");
        assert_eq!(Value::from(42).to_output(), "42");
        assert_eq!(Value::from(1.5).to_output(), "1.5");
        assert_eq!(Value::from(true).to_output(), "true");
        assert_eq!(Value::from(false).to_output(), "false");
        assert_eq!(Value::Absent.to_output(), "");
        assert_eq!(Value::from(vec![1, 2]).to_output(), "");
        assert_eq!(Value::Mapping(Mapping::new()).to_output(), "");
    }

    #[test]
    fn test_lookup_nested_mapping() {
        let ctx = Context::new().with(
            "request_type",
            Value::from_iter([("name", "GET_USER")]),
        );
        let path = Path::parse("request_type.name").unwrap();
        assert_eq!(ctx.lookup(&path), Some(&Value::from("GET_USER")));
    }

    #[test]
    fn test_lookup_missing_is_none() {
        let ctx = Context::new().with("name", "Foo");
        assert_eq!(ctx.lookup(&Path::parse("missing").unwrap()), None);
        assert_eq!(ctx.lookup(&Path::parse("name.length").unwrap()), None);
    }

    #[test]
    fn test_lookup_sequence_index() {
        let ctx = Context::new().with("items", vec!["a", "b"]);
        assert_eq!(
            ctx.lookup(&Path::parse("items.1").unwrap()),
            Some(&Value::from("b"))
        );
        assert_eq!(ctx.lookup(&Path::parse("items.5").unwrap()), None);
    }

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({"a": null, "b": [1, 2.5], "c": {"d": true}}));
        let Value::Mapping(map) = value else {
            panic!("expected mapping");
        };
        assert_eq!(map["a"], Value::Absent);
        assert_eq!(map["b"], Value::Sequence(vec![Value::Integer(1), Value::Float(2.5)]));
        assert_eq!(map["c"].attr("d"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_context_from_serialize() {
        #[derive(Serialize)]
        struct Model {
            name: String,
            fields: Vec<&'static str>,
        }

        let ctx = Context::from_serialize(&Model {
            name: "User".to_string(),
            fields: vec!["id", "email"],
        })
        .unwrap();
        assert_eq!(ctx.get("name"), Some(&Value::from("User")));
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_context_from_serialize_rejects_non_mapping() {
        let err = Context::from_serialize(&vec![1, 2]).unwrap_err();
        assert!(matches!(err, ContextError::NotAMapping { found: "sequence" }));
    }

    #[test]
    fn test_context_preserves_insertion_order() {
        let ctx: Context = [("z", 1), ("a", 2), ("m", 3)].into_iter().collect();
        let keys: Vec<_> = ctx.as_mapping().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }
}
