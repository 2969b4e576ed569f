//! Tree-walking renderer
//!
//! Rendering borrows the compiled nodes and the caller's context for the
//! duration of one call. Loop frames and the output buffer live only inside
//! that call; on error the partially filled buffer is dropped.

use std::borrow::Cow;

use tracing::trace;

use crate::{
    ast::{ForNode, IfNode, Node, Path, VariableNode},
    error::RenderError,
    filters::FilterRegistry,
    value::{Context, Mapping, Value},
};

/// Reserved name of the loop metadata mapping
pub const LOOP_META: &str = "forloop";

/// Metadata names the innermost loop also answers without the `forloop.` prefix
pub(crate) const BARE_LOOP_META: [&str; 4] = ["first", "last", "index", "count"];

/// Render `nodes` against `context`, resolving filters in `filters`
pub fn render_nodes(
    nodes: &[Node],
    context: &Context,
    filters: &FilterRegistry,
) -> Result<String, RenderError> {
    let mut renderer = Renderer {
        context,
        filters,
        frames: Vec::new(),
        output: String::new(),
    };
    renderer.render_nodes(nodes)?;
    Ok(renderer.output)
}

/// Per-nesting-level loop state
struct LoopFrame<'a> {
    var: &'a str,
    item: &'a Value,
    index: usize,
    count: usize,
}

impl LoopFrame<'_> {
    fn is_first(&self) -> bool {
        self.index == 0
    }

    fn is_last(&self) -> bool {
        self.index + 1 == self.count
    }

    fn meta(&self, name: &str) -> Option<Value> {
        let value = match name {
            "first" => Value::from(self.is_first()),
            "last" => Value::from(self.is_last()),
            "index" => Value::from(self.index),
            "counter" => Value::from(self.index + 1),
            "counter0" => Value::from(self.index),
            "revcounter" => Value::from(self.count - self.index),
            "revcounter0" => Value::from(self.count - self.index - 1),
            "count" => Value::from(self.count),
            _ => return None,
        };
        Some(value)
    }

    fn meta_mapping(&self) -> Value {
        let map: Mapping = [
            "first",
            "last",
            "index",
            "counter",
            "counter0",
            "revcounter",
            "revcounter0",
            "count",
        ]
        .into_iter()
        .filter_map(|name| self.meta(name).map(|value| (name.to_string(), value)))
        .collect();
        Value::Mapping(map)
    }
}

struct Renderer<'a> {
    context: &'a Context,
    filters: &'a FilterRegistry,
    frames: Vec<LoopFrame<'a>>,
    output: String,
}

impl<'a> Renderer<'a> {
    fn render_nodes(&mut self, nodes: &'a [Node]) -> Result<(), RenderError> {
        for node in nodes {
            match node {
                Node::Literal(text) => self.output.push_str(text),
                Node::Variable(variable) => self.render_variable(variable)?,
                Node::For(for_node) => self.render_for(for_node)?,
                Node::If(if_node) => self.render_if(if_node)?,
            }
        }
        Ok(())
    }

    fn render_variable(&mut self, node: &'a VariableNode) -> Result<(), RenderError> {
        let value = self.resolve(&node.path);
        let mut text = value.to_output().into_owned();

        for name in &node.filters {
            let filter = self
                .filters
                .get(name)
                .ok_or_else(|| RenderError::UnknownFilter {
                    name: name.clone(),
                    offset: node.offset,
                })?;
            text = filter(&text);
        }

        self.output.push_str(&text);
        Ok(())
    }

    fn render_for(&mut self, node: &'a ForNode) -> Result<(), RenderError> {
        // Loop metadata is never a sequence, so only borrowed data can be iterated.
        let items: &'a [Value] = match self.resolve(&node.source) {
            Cow::Borrowed(Value::Sequence(items)) => items,
            _ => &[],
        };

        if items.is_empty() {
            trace!(source = %node.source, "loop source empty");
            if let Some(empty) = &node.empty {
                self.render_nodes(empty)?;
            }
            return Ok(());
        }

        self.frames.push(LoopFrame {
            var: &node.var,
            item: &items[0],
            index: 0,
            count: items.len(),
        });

        let result = self.render_iterations(&node.body, items);
        self.frames.pop();
        result
    }

    fn render_iterations(&mut self, body: &'a [Node], items: &'a [Value]) -> Result<(), RenderError> {
        for (index, item) in items.iter().enumerate() {
            if let Some(frame) = self.frames.last_mut() {
                frame.index = index;
                frame.item = item;
            }
            self.render_nodes(body)?;
        }
        Ok(())
    }

    fn render_if(&mut self, node: &'a IfNode) -> Result<(), RenderError> {
        let passed = self.resolve(&node.condition).is_truthy() != node.negated;

        if passed {
            self.render_nodes(&node.then_body)
        } else if let Some(else_body) = &node.else_body {
            self.render_nodes(else_body)
        } else {
            Ok(())
        }
    }

    /// Resolve a path through the loop frames, then the context
    ///
    /// The innermost frame answers its loop variable and the loop metadata;
    /// outer frames answer only their loop variable.
    fn resolve(&self, path: &Path) -> Cow<'a, Value> {
        let head = path.head();

        for (depth, frame) in self.frames.iter().rev().enumerate() {
            if frame.var == head {
                return lookup_rest(frame.item, path.rest());
            }
            if depth == 0 {
                if head == LOOP_META {
                    return Cow::Owned(owned_rest(frame.meta_mapping(), path.rest()));
                }
                if BARE_LOOP_META.iter().any(|name| *name == head) {
                    if let Some(value) = frame.meta(head) {
                        return Cow::Owned(owned_rest(value, path.rest()));
                    }
                }
            }
        }

        match self.context.get(head) {
            Some(value) => lookup_rest(value, path.rest()),
            None => Cow::Owned(Value::Absent),
        }
    }
}

fn lookup_rest<'a>(value: &'a Value, rest: &[String]) -> Cow<'a, Value> {
    match value.lookup_segments(rest) {
        Some(found) => Cow::Borrowed(found),
        None => Cow::Owned(Value::Absent),
    }
}

fn owned_rest(value: Value, rest: &[String]) -> Value {
    value.lookup_segments(rest).cloned().unwrap_or_default()
}
