//! Template parser
//!
//! Turns the lexer's flat token stream into a tree of [`Node`]s, matching
//! `for`/`endfor` and `if`/`endif` pairs with an explicit stack of open blocks.

use crate::{
    ast::{ForNode, IfNode, Node, VariableNode},
    error::{CompileError, TagKind},
    lexer::{BlockTag, Token, TokenKind},
};

/// Parse a token stream into the root node sequence
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Node>, CompileError> {
    let mut parser = Parser::new();
    for token in tokens {
        parser.push(token)?;
    }
    parser.finish()
}

/// A block whose closing tag has not been seen yet
struct OpenBlock {
    tag: BlockTag,
    offset: usize,
    body: Vec<Node>,
    /// `else`/`empty` branch, once its tag has been seen
    branch: Option<Vec<Node>>,
}

impl OpenBlock {
    fn kind(&self) -> TagKind {
        self.tag.kind()
    }

    fn current(&mut self) -> &mut Vec<Node> {
        self.branch.as_mut().unwrap_or(&mut self.body)
    }

    fn into_node(self) -> Node {
        match self.tag {
            BlockTag::For { var, source } => Node::For(ForNode {
                var,
                source,
                body: self.body,
                empty: self.branch,
            }),
            BlockTag::If { condition, negated } => Node::If(IfNode {
                condition,
                negated,
                then_body: self.body,
                else_body: self.branch,
            }),
        }
    }
}

struct Parser {
    root: Vec<Node>,
    stack: Vec<OpenBlock>,
}

impl Parser {
    fn new() -> Self {
        Self {
            root: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn current_body(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(block) => block.current(),
            None => &mut self.root,
        }
    }

    /// Append text, merging with a directly preceding literal
    fn push_literal(&mut self, text: &str) {
        let body = self.current_body();
        if let Some(Node::Literal(previous)) = body.last_mut() {
            previous.push_str(text);
        } else {
            body.push(Node::Literal(text.to_string()));
        }
    }

    fn push(&mut self, token: Token) -> Result<(), CompileError> {
        let offset = token.span.start;

        match token.kind {
            TokenKind::Literal(text) => self.push_literal(&text),
            TokenKind::TemplateTag(kind) => self.push_literal(kind.text()),
            TokenKind::VariableRef { path, filters } => {
                self.current_body().push(Node::Variable(VariableNode {
                    path,
                    filters,
                    offset,
                }));
            }
            TokenKind::TagStart(tag) => self.stack.push(OpenBlock {
                tag,
                offset,
                body: Vec::new(),
                branch: None,
            }),
            TokenKind::TagBranch(tag) => {
                let owner = match tag {
                    TagKind::Else => TagKind::If,
                    _ => TagKind::For,
                };
                match self.stack.last_mut() {
                    Some(block) if block.kind() == owner && block.branch.is_none() => {
                        block.branch = Some(Vec::new());
                    }
                    _ => return Err(CompileError::MisplacedTag { tag, offset }),
                }
            }
            TokenKind::TagEnd(tag) => {
                let block = self
                    .stack
                    .pop()
                    .ok_or(CompileError::UnopenedTag { tag, offset })?;
                if block.kind().closing() != Some(tag) {
                    return Err(CompileError::MismatchedTag {
                        found: tag,
                        open: block.kind(),
                        open_offset: block.offset,
                        offset,
                    });
                }
                let node = block.into_node();
                self.current_body().push(node);
            }
        }

        Ok(())
    }

    fn finish(self) -> Result<Vec<Node>, CompileError> {
        if let Some(block) = self.stack.last() {
            return Err(CompileError::UnclosedTag {
                tag: block.kind(),
                offset: block.offset,
            });
        }
        Ok(self.root)
    }
}
