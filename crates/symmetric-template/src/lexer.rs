//! Template lexer
//!
//! Splits template source into literal runs, `{{ ... }}` variable references
//! and `{% ... %}` tags. Every token records the byte span it was read from,
//! so the token stream always covers the source exactly.

use std::ops::Range;

use crate::{
    ast::{is_identifier, Path},
    error::{CompileError, Delimiter, TagKind},
};

/// A lexed token together with the source bytes it covers
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was read
    pub kind: TokenKind,
    /// Byte range in the source, delimiters included
    pub span: Range<usize>,
}

/// Token variants produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Text outside any delimiter, unchanged
    Literal(String),
    /// `{{ path|filter1|filter2 }}`
    VariableRef {
        /// Lookup path
        path: Path,
        /// Filter names in written order
        filters: Vec<String>,
    },
    /// A tag opening a block: `for` or `if`
    TagStart(BlockTag),
    /// A tag splitting a block: `else` or `empty`
    TagBranch(TagKind),
    /// A tag closing a block: `endfor` or `endif`
    TagEnd(TagKind),
    /// `{% templatetag name %}`
    TemplateTag(TemplateTagKind),
}

/// Arguments of a block-opening tag
#[derive(Debug, Clone, PartialEq)]
pub enum BlockTag {
    /// `for var in source`
    For {
        /// Loop variable
        var: String,
        /// Sequence path
        source: Path,
    },
    /// `if [not] condition`
    If {
        /// Tested path
        condition: Path,
        /// Whether `not` was given
        negated: bool,
    },
}

impl BlockTag {
    /// Kind of the tag
    pub fn kind(&self) -> TagKind {
        match self {
            BlockTag::For { .. } => TagKind::For,
            BlockTag::If { .. } => TagKind::If,
        }
    }
}

/// Delimiter text emitted by `{% templatetag %}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateTagKind {
    /// `{%`
    OpenBlock,
    /// `%}`
    CloseBlock,
    /// `{{`
    OpenVariable,
    /// `}}`
    CloseVariable,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// `{#`
    OpenComment,
    /// `#}`
    CloseComment,
}

impl TemplateTagKind {
    /// Look up a templatetag argument by name
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "openblock" => TemplateTagKind::OpenBlock,
            "closeblock" => TemplateTagKind::CloseBlock,
            "openvariable" => TemplateTagKind::OpenVariable,
            "closevariable" => TemplateTagKind::CloseVariable,
            "openbrace" => TemplateTagKind::OpenBrace,
            "closebrace" => TemplateTagKind::CloseBrace,
            "opencomment" => TemplateTagKind::OpenComment,
            "closecomment" => TemplateTagKind::CloseComment,
            _ => return None,
        };
        Some(kind)
    }

    /// Text this tag renders to
    pub fn text(self) -> &'static str {
        match self {
            TemplateTagKind::OpenBlock => "{%",
            TemplateTagKind::CloseBlock => "%}",
            TemplateTagKind::OpenVariable => "{{",
            TemplateTagKind::CloseVariable => "}}",
            TemplateTagKind::OpenBrace => "{",
            TemplateTagKind::CloseBrace => "}",
            TemplateTagKind::OpenComment => "{#",
            TemplateTagKind::CloseComment => "#}",
        }
    }
}

/// Tokenize a complete template
pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
    Lexer::new(source).tokenize()
}

struct Lexer<'a> {
    source: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();

        while self.position < self.source.len() {
            match self.find_open() {
                Some((start, delimiter)) => {
                    if start > self.position {
                        tokens.push(self.literal(self.position..start));
                    }
                    let token = self.lex_delimited(start, delimiter)?;
                    tokens.push(token);
                }
                None => {
                    tokens.push(self.literal(self.position..self.source.len()));
                    self.position = self.source.len();
                }
            }
        }

        Ok(tokens)
    }

    fn literal(&self, span: Range<usize>) -> Token {
        Token {
            kind: TokenKind::Literal(self.source[span.clone()].to_string()),
            span,
        }
    }

    /// Find the next `{{` or `{%` at or after the current position
    fn find_open(&self) -> Option<(usize, Delimiter)> {
        let rest = &self.source[self.position..];
        let bytes = rest.as_bytes();
        let mut search = 0;

        while let Some(found) = rest[search..].find('{') {
            let at = search + found;
            match bytes.get(at + 1) {
                Some(b'{') => return Some((self.position + at, Delimiter::Variable)),
                Some(b'%') => return Some((self.position + at, Delimiter::Block)),
                _ => search = at + 1,
            }
        }

        None
    }

    fn lex_delimited(&mut self, start: usize, delimiter: Delimiter) -> Result<Token, CompileError> {
        let body_start = start + delimiter.open().len();
        let body_len = self.source[body_start..]
            .find(delimiter.close())
            .ok_or(CompileError::UnterminatedTag {
                delimiter,
                offset: start,
            })?;
        let body_end = body_start + body_len;
        let body = &self.source[body_start..body_end];

        self.position = body_end + delimiter.close().len();

        let kind = match delimiter {
            Delimiter::Variable => lex_variable(body, start)?,
            Delimiter::Block => lex_tag(body, start)?,
        };

        Ok(Token {
            kind,
            span: start..self.position,
        })
    }
}

fn lex_variable(body: &str, offset: usize) -> Result<TokenKind, CompileError> {
    let invalid = |reason: String| CompileError::InvalidExpression {
        expression: body.trim().to_string(),
        offset,
        reason,
    };

    let mut parts = body.split('|');
    let path_text = parts.next().unwrap_or_default();
    let path = Path::parse(path_text).map_err(invalid)?;

    let mut filters = Vec::new();
    for part in parts {
        let name = part.trim();
        if name.is_empty() {
            return Err(invalid("empty filter name".to_string()));
        }
        if name.contains(':') {
            return Err(invalid(format!("filter `{}` takes no arguments", name)));
        }
        if !is_identifier(name) {
            return Err(invalid(format!("`{}` is not a valid filter name", name)));
        }
        filters.push(name.to_string());
    }

    Ok(TokenKind::VariableRef { path, filters })
}

fn lex_tag(body: &str, offset: usize) -> Result<TokenKind, CompileError> {
    let words: Vec<&str> = body.split_whitespace().collect();
    let Some(&keyword) = words.first() else {
        return Err(CompileError::UnknownTagKeyword {
            keyword: String::new(),
            offset,
        });
    };

    let malformed = |tag: TagKind, reason: &str| CompileError::MalformedTag {
        tag,
        offset,
        reason: reason.to_string(),
    };

    let kind = match keyword {
        "for" => {
            let [_, var, "in", source] = words.as_slice() else {
                return Err(malformed(TagKind::For, "expected `for <name> in <path>`"));
            };
            if !is_identifier(var) {
                return Err(malformed(TagKind::For, "loop variable must be a plain name"));
            }
            let source = Path::parse(source).map_err(|reason| CompileError::MalformedTag {
                tag: TagKind::For,
                offset,
                reason,
            })?;
            TokenKind::TagStart(BlockTag::For {
                var: var.to_string(),
                source,
            })
        }
        "if" => {
            let (negated, condition) = match words.as_slice() {
                [_, "not"] => return Err(malformed(TagKind::If, "missing path after `not`")),
                [_, condition] => (false, *condition),
                [_, "not", condition] => (true, *condition),
                [_] => return Err(malformed(TagKind::If, "missing condition path")),
                _ => return Err(malformed(TagKind::If, "expected `if [not] <path>`")),
            };
            let condition = Path::parse(condition).map_err(|reason| CompileError::MalformedTag {
                tag: TagKind::If,
                offset,
                reason,
            })?;
            TokenKind::TagStart(BlockTag::If { condition, negated })
        }
        "else" | "empty" | "endfor" | "endif" => {
            let tag = match keyword {
                "else" => TagKind::Else,
                "empty" => TagKind::Empty,
                "endfor" => TagKind::EndFor,
                _ => TagKind::EndIf,
            };
            if words.len() != 1 {
                return Err(malformed(tag, "takes no arguments"));
            }
            match tag {
                TagKind::Else | TagKind::Empty => TokenKind::TagBranch(tag),
                _ => TokenKind::TagEnd(tag),
            }
        }
        "templatetag" => {
            let [_, name] = words.as_slice() else {
                return Err(malformed(TagKind::TemplateTag, "expected `templatetag <name>`"));
            };
            let kind = TemplateTagKind::from_name(name)
                .ok_or_else(|| malformed(TagKind::TemplateTag, &format!("unknown name `{}`", name)))?;
            TokenKind::TemplateTag(kind)
        }
        other => {
            return Err(CompileError::UnknownTagKeyword {
                keyword: other.to_string(),
                offset,
            })
        }
    };

    Ok(kind)
}
