//! Error types for template compilation and rendering

use std::fmt;

use thiserror::Error;

/// Kind of template tag, used to name the construct an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// `{% for var in path %}`
    For,
    /// `{% empty %}` inside a for block
    Empty,
    /// `{% endfor %}`
    EndFor,
    /// `{% if [not] path %}`
    If,
    /// `{% else %}` inside an if block
    Else,
    /// `{% endif %}`
    EndIf,
    /// `{% templatetag name %}`
    TemplateTag,
}

impl TagKind {
    /// Keyword that introduces this tag
    pub fn keyword(self) -> &'static str {
        match self {
            TagKind::For => "for",
            TagKind::Empty => "empty",
            TagKind::EndFor => "endfor",
            TagKind::If => "if",
            TagKind::Else => "else",
            TagKind::EndIf => "endif",
            TagKind::TemplateTag => "templatetag",
        }
    }

    /// The tag that closes a block opened by this tag, if it opens one
    pub fn closing(self) -> Option<TagKind> {
        match self {
            TagKind::For => Some(TagKind::EndFor),
            TagKind::If => Some(TagKind::EndIf),
            _ => None,
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Delimiter family of a template expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    /// `{{ ... }}`
    Variable,
    /// `{% ... %}`
    Block,
}

impl Delimiter {
    /// Opening delimiter text
    pub fn open(self) -> &'static str {
        match self {
            Delimiter::Variable => "{{",
            Delimiter::Block => "{%",
        }
    }

    /// Closing delimiter text
    pub fn close(self) -> &'static str {
        match self {
            Delimiter::Variable => "}}",
            Delimiter::Block => "%}",
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.open())
    }
}

/// Errors raised while lexing or parsing a template
///
/// Compilation stops at the first error; no template is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// An opening delimiter with no matching close before end of input
    #[error("unterminated `{delimiter}` at byte {offset}: expected `{}`", .delimiter.close())]
    UnterminatedTag {
        /// Delimiter family that was left open
        delimiter: Delimiter,
        /// Byte offset of the opening delimiter
        offset: usize,
    },

    /// A `{% ... %}` body whose keyword is not a known tag
    #[error("unknown tag keyword `{keyword}` at byte {offset}")]
    UnknownTagKeyword {
        /// The unrecognized keyword
        keyword: String,
        /// Byte offset of the tag
        offset: usize,
    },

    /// A known tag with invalid arguments
    #[error("malformed `{tag}` tag at byte {offset}: {reason}")]
    MalformedTag {
        /// Tag that failed to parse
        tag: TagKind,
        /// Byte offset of the tag
        offset: usize,
        /// What was wrong with it
        reason: String,
    },

    /// A `{{ ... }}` body that is not a path followed by filters
    #[error("invalid expression `{expression}` at byte {offset}: {reason}")]
    InvalidExpression {
        /// Raw expression text
        expression: String,
        /// Byte offset of the expression
        offset: usize,
        /// What was wrong with it
        reason: String,
    },

    /// A closing tag that does not match the innermost open block
    #[error("`{found}` at byte {offset} does not close `{open}` opened at byte {open_offset}")]
    MismatchedTag {
        /// Closing tag that was found
        found: TagKind,
        /// Block that is actually open
        open: TagKind,
        /// Byte offset of the open block's tag
        open_offset: usize,
        /// Byte offset of the closing tag
        offset: usize,
    },

    /// A closing tag with no open block at all
    #[error("`{tag}` at byte {offset} has no matching opening tag")]
    UnopenedTag {
        /// Closing tag that was found
        tag: TagKind,
        /// Byte offset of the closing tag
        offset: usize,
    },

    /// A branch tag outside the block it belongs to, or repeated
    #[error("`{tag}` at byte {offset} is not allowed here")]
    MisplacedTag {
        /// Branch tag that was found
        tag: TagKind,
        /// Byte offset of the branch tag
        offset: usize,
    },

    /// A block still open at end of input
    #[error("`{tag}` opened at byte {offset} is never closed")]
    UnclosedTag {
        /// Block that was left open
        tag: TagKind,
        /// Byte offset of the block's opening tag
        offset: usize,
    },
}

impl CompileError {
    /// Byte offset in the template source the error points at
    pub fn offset(&self) -> usize {
        match self {
            CompileError::UnterminatedTag { offset, .. }
            | CompileError::UnknownTagKeyword { offset, .. }
            | CompileError::MalformedTag { offset, .. }
            | CompileError::InvalidExpression { offset, .. }
            | CompileError::MismatchedTag { offset, .. }
            | CompileError::UnopenedTag { offset, .. }
            | CompileError::MisplacedTag { offset, .. }
            | CompileError::UnclosedTag { offset, .. } => *offset,
        }
    }

    /// Tag the error refers to, when it concerns a block tag
    pub fn tag(&self) -> Option<TagKind> {
        match self {
            CompileError::MalformedTag { tag, .. }
            | CompileError::UnopenedTag { tag, .. }
            | CompileError::MisplacedTag { tag, .. }
            | CompileError::UnclosedTag { tag, .. } => Some(*tag),
            CompileError::MismatchedTag { found, .. } => Some(*found),
            CompileError::UnterminatedTag { .. }
            | CompileError::UnknownTagKeyword { .. }
            | CompileError::InvalidExpression { .. } => None,
        }
    }
}

/// Errors raised while rendering a compiled template
///
/// A failed render produces no output; the template stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A filter name not present in the registry when it was applied
    #[error("unknown filter `{name}` at byte {offset}")]
    UnknownFilter {
        /// Filter name as written in the template
        name: String,
        /// Byte offset of the variable expression using it
        offset: usize,
    },
}

/// Errors raised while building a [`Context`](crate::Context) from serializable data
#[derive(Debug, Error)]
pub enum ContextError {
    /// The value could not be serialized
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The value serialized to something other than a mapping
    #[error("context root must be a mapping, found {found}")]
    NotAMapping {
        /// Kind of value that was found instead
        found: &'static str,
    },
}

/// Convert a byte offset into a 1-based (line, column) pair
///
/// Columns count characters, not bytes. Offsets past the end clamp to the end.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|pos| pos + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}
