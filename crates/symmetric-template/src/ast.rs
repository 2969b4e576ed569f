//! Compiled template tree
//!
//! Nodes are built once by the parser and never mutated afterwards.

use std::fmt;

/// Dotted lookup path such as `request_type.name` or `items.0`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Parse a dotted path, returning a reason on failure
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("empty path".to_string());
        }

        let mut segments = Vec::new();
        for (position, segment) in text.split('.').enumerate() {
            if position == 0 && !is_identifier(segment) {
                return Err(format!("`{}` is not a valid name", segment));
            }
            if !is_identifier(segment) && !is_index(segment) {
                return Err(format!("`{}` is not a valid path segment", segment));
            }
            segments.push(segment.to_string());
        }

        Ok(Self { segments })
    }

    /// First segment, the name looked up in the scopes
    pub fn head(&self) -> &str {
        &self.segments[0]
    }

    /// Segments after the head, applied as attribute accesses
    pub fn rest(&self) -> &[String] {
        &self.segments[1..]
    }

    /// All segments in order
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Whether `text` is an identifier: `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_index(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// A node of the compiled template
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Text emitted verbatim
    Literal(String),
    /// `{{ path|filter }}`
    Variable(VariableNode),
    /// `{% for var in path %}...{% endfor %}`
    For(ForNode),
    /// `{% if [not] path %}...{% endif %}`
    If(IfNode),
}

/// Variable output with its filter chain
#[derive(Debug, Clone, PartialEq)]
pub struct VariableNode {
    /// Lookup path
    pub path: Path,
    /// Filter names, applied left to right
    pub filters: Vec<String>,
    /// Byte offset of the `{{` in the source
    pub offset: usize,
}

/// Iteration block
#[derive(Debug, Clone, PartialEq)]
pub struct ForNode {
    /// Name bound to the current element
    pub var: String,
    /// Path of the sequence to iterate
    pub source: Path,
    /// Rendered once per element
    pub body: Vec<Node>,
    /// Rendered instead of the body when there are no elements
    pub empty: Option<Vec<Node>>,
}

/// Conditional block
#[derive(Debug, Clone, PartialEq)]
pub struct IfNode {
    /// Path whose truthiness is tested
    pub condition: Path,
    /// Whether the test is inverted by `not`
    pub negated: bool,
    /// Rendered when the test passes
    pub then_body: Vec<Node>,
    /// Rendered when the test fails
    pub else_body: Option<Vec<Node>>,
}
