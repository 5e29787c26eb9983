use crate::parser::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Text(String),
    Open,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

/// Splits VDF text into quoted/bare strings and braces, skipping `//` comments.
pub(crate) struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        let src = src.strip_prefix('\u{feff}').unwrap_or(src);
        Self { src, pos: 0, line: 1 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.rest().starts_with("//") => {
                    while let Some(ch) = self.bump() {
                        if ch == '\n' {
                            break;
                        }
                    }
                }
                _ => return,
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        self.skip_trivia();
        let line = self.line;
        let kind = match self.peek() {
            None => return Ok(None),
            Some('{') => {
                self.bump();
                TokenKind::Open
            }
            Some('}') => {
                self.bump();
                TokenKind::Close
            }
            Some('"') => {
                self.bump();
                TokenKind::Text(self.quoted(line)?)
            }
            Some(_) => TokenKind::Text(self.bare()),
        };
        Ok(Some(Token { kind, line }))
    }

    fn quoted(&mut self, start_line: usize) -> Result<String, ParseError> {
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(ParseError::UnterminatedString { line: start_line }),
                Some('"') => return Ok(text),
                Some('\\') => match self.bump() {
                    None => return Err(ParseError::UnterminatedString { line: start_line }),
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('\\') => text.push('\\'),
                    Some('"') => text.push('"'),
                    Some(other) => {
                        text.push('\\');
                        text.push(other);
                    }
                },
                Some(ch) => text.push(ch),
            }
        }
    }

    fn bare(&mut self) -> String {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || matches!(ch, '{' | '}' | '"') {
                break;
            }
            text.push(ch);
            self.bump();
        }
        text
    }
}
