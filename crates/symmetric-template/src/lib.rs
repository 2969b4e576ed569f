#![warn(missing_docs)]

//! Template engine for model boilerplate generation
//!
//! Compiles Django-style templates once and renders them against a read-only
//! [`Context`]:
//!
//! ```text
//! {{ path }}  {{ path|upper|lower }}           - variable output with filters
//! {% for item in path %}...{% endfor %}         - iteration, with {% empty %}
//! {% if [not] path %}...{% else %}...{% endif %} - conditionals
//! {{ forloop.counter }}  {% if not last %}      - loop metadata
//! {% templatetag openbrace %}                   - literal delimiters
//! ```
//!
//! Missing values never fail a render: they print as empty text, iterate zero
//! times and test false. The only render-time error is an unknown filter.
//!
//! # Example
//!
//! ```
//! use symmetric_template::{compile, render, Context};
//!
//! let template = compile("{% for x in items %}{{ x }}{% if not last %},{% endif %}{% endfor %}")?;
//! let ctx = Context::new().with("items", vec!["a", "b", "c"]);
//! assert_eq!(render(&template, &ctx)?, "a,b,c");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod ast;
pub mod error;
pub mod filters;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod template;
pub mod value;

pub use ast::{ForNode, IfNode, Node, Path, VariableNode};
pub use error::{line_col, CompileError, ContextError, Delimiter, RenderError, TagKind};
pub use filters::{global_filters, register_filter, with_global_filters, FilterFn, FilterRegistry};
pub use lexer::{tokenize, Token, TokenKind};
pub use render::LOOP_META;
pub use template::Template;
pub use value::{Context, Mapping, Value};

/// Compile template text into a reusable [`Template`]
pub fn compile(source: &str) -> Result<Template, CompileError> {
    Template::compile(source)
}

/// Render a compiled template with the process-wide filter registry
pub fn render(template: &Template, context: &Context) -> Result<String, RenderError> {
    template.render(context)
}
