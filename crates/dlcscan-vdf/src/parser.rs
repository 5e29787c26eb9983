use thiserror::Error;

use crate::lexer::{Lexer, Token, TokenKind};
use crate::node::Property;

/// Nesting limit guarding the recursive descent against hostile input.
const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unterminated quoted string starting at line {line}")]
    UnterminatedString { line: usize },
    #[error("key \"{key}\" at line {line} has no value")]
    MissingValue { key: String, line: usize },
    #[error("block \"{key}\" opened at line {line} is never closed")]
    UnclosedBlock { key: String, line: usize },
    #[error("unbalanced closing brace at line {line}")]
    UnbalancedClose { line: usize },
    #[error("unexpected '{{' at line {line}")]
    UnexpectedOpen { line: usize },
    #[error("nesting too deep at line {line}")]
    TooDeep { line: usize },
    #[error("trailing data after the root property at line {line}")]
    TrailingData { line: usize },
    #[error("document contains no properties")]
    Empty,
}

/// Parses a document holding exactly one root property.
pub fn parse(text: &str) -> Result<Property, ParseError> {
    let mut parser = Parser::new(text);
    let root = parser.next_property()?.ok_or(ParseError::Empty)?;
    if let Some(token) = parser.lexer.next_token()? {
        return Err(ParseError::TrailingData { line: token.line });
    }
    Ok(root)
}

/// Parses a document holding any number of root properties, such as an app-info dump.
pub fn parse_document(text: &str) -> Result<Vec<Property>, ParseError> {
    let mut parser = Parser::new(text);
    let mut roots = Vec::new();
    while let Some(property) = parser.next_property()? {
        roots.push(property);
    }
    Ok(roots)
}

struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lexer: Lexer::new(text),
        }
    }

    fn next_property(&mut self) -> Result<Option<Property>, ParseError> {
        match self.lexer.next_token()? {
            None => Ok(None),
            Some(Token {
                kind: TokenKind::Text(key),
                line,
            }) => self.value_for(key, line, 0).map(Some),
            Some(Token {
                kind: TokenKind::Open,
                line,
            }) => Err(ParseError::UnexpectedOpen { line }),
            Some(Token {
                kind: TokenKind::Close,
                line,
            }) => Err(ParseError::UnbalancedClose { line }),
        }
    }

    fn value_for(
        &mut self,
        key: String,
        key_line: usize,
        depth: usize,
    ) -> Result<Property, ParseError> {
        let token = match self.lexer.next_token()? {
            Some(token) => token,
            None => return Err(ParseError::MissingValue { key, line: key_line }),
        };
        match token.kind {
            TokenKind::Text(value) => Ok(Property::leaf(key, value)),
            TokenKind::Close => Err(ParseError::MissingValue { key, line: key_line }),
            TokenKind::Open => {
                if depth >= MAX_DEPTH {
                    return Err(ParseError::TooDeep { line: token.line });
                }
                let open_line = token.line;
                let mut children = Vec::new();
                loop {
                    let Some(next) = self.lexer.next_token()? else {
                        return Err(ParseError::UnclosedBlock {
                            key,
                            line: open_line,
                        });
                    };
                    match next.kind {
                        TokenKind::Close => break,
                        TokenKind::Open => {
                            return Err(ParseError::UnexpectedOpen { line: next.line })
                        }
                        TokenKind::Text(child) => {
                            children.push(self.value_for(child, next.line, depth + 1)?);
                        }
                    }
                }
                Ok(Property::branch(key, children))
            }
        }
    }
}
