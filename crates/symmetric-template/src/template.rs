//! Compiled templates

use std::{collections::BTreeSet, str::FromStr};

use tracing::debug;

use crate::{
    ast::{Node, Path},
    error::{CompileError, RenderError},
    filters::{with_global_filters, FilterRegistry},
    lexer::tokenize,
    parser::parse,
    render::{render_nodes, BARE_LOOP_META, LOOP_META},
    value::Context,
};

/// A template compiled once and rendered any number of times
///
/// Templates hold no per-render state and can be shared between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Compile template source text
    ///
    /// # Arguments
    /// * `source` - Complete template text
    ///
    /// # Returns
    /// The compiled template, or the first lex/parse error with its byte offset
    pub fn compile(source: &str) -> Result<Self, CompileError> {
        let tokens = tokenize(source)?;
        let token_count = tokens.len();
        let nodes = parse(tokens)?;

        debug!(
            bytes = source.len(),
            tokens = token_count,
            nodes = nodes.len(),
            "compiled template"
        );

        Ok(Self { nodes })
    }

    /// Render against `context` using a snapshot of the process-wide filter registry
    ///
    /// Filters registered while the render runs apply from the next render on.
    pub fn render(&self, context: &Context) -> Result<String, RenderError> {
        with_global_filters(|filters| self.render_with(context, filters))
    }

    /// Render against `context` using an explicit filter registry
    pub fn render_with(
        &self,
        context: &Context,
        filters: &FilterRegistry,
    ) -> Result<String, RenderError> {
        render_nodes(&self.nodes, context, filters)
    }

    /// Root node sequence
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Top-level context names this template reads
    ///
    /// Names bound by an enclosing loop, and loop metadata inside loops, are
    /// not included.
    pub fn placeholders(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        collect_placeholders(&self.nodes, &mut Vec::new(), &mut names);
        names
    }

    /// Names of all filters this template applies
    pub fn filter_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        collect_filters(&self.nodes, &mut names);
        names
    }
}

impl FromStr for Template {
    type Err = CompileError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::compile(source)
    }
}

fn note_path(path: &Path, bound: &[&str], names: &mut BTreeSet<String>) {
    let head = path.head();
    if bound.iter().any(|name| *name == head) {
        return;
    }
    if !bound.is_empty() && (head == LOOP_META || BARE_LOOP_META.iter().any(|name| *name == head)) {
        return;
    }
    names.insert(head.to_string());
}

fn collect_placeholders<'a>(nodes: &'a [Node], bound: &mut Vec<&'a str>, names: &mut BTreeSet<String>) {
    for node in nodes {
        match node {
            Node::Literal(_) => {}
            Node::Variable(variable) => note_path(&variable.path, bound, names),
            Node::For(for_node) => {
                note_path(&for_node.source, bound, names);
                bound.push(&for_node.var);
                collect_placeholders(&for_node.body, bound, names);
                bound.pop();
                if let Some(empty) = &for_node.empty {
                    collect_placeholders(empty, bound, names);
                }
            }
            Node::If(if_node) => {
                note_path(&if_node.condition, bound, names);
                collect_placeholders(&if_node.then_body, bound, names);
                if let Some(else_body) = &if_node.else_body {
                    collect_placeholders(else_body, bound, names);
                }
            }
        }
    }
}

fn collect_filters(nodes: &[Node], names: &mut BTreeSet<String>) {
    for node in nodes {
        match node {
            Node::Literal(_) => {}
            Node::Variable(variable) => names.extend(variable.filters.iter().cloned()),
            Node::For(for_node) => {
                collect_filters(&for_node.body, names);
                if let Some(empty) = &for_node.empty {
                    collect_filters(empty, names);
                }
            }
            Node::If(if_node) => {
                collect_filters(&if_node.then_body, names);
                if let Some(else_body) = &if_node.else_body {
                    collect_filters(else_body, names);
                }
            }
        }
    }
}
