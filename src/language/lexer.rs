use crate::language::{
    span::Position,
    token::{reserved_literal, LiteralToken, Operator, Token, TokenKind, MAX_OPERATOR_LENGTH},
};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message} at line {line}, column {column}")]
pub struct LexError {
    pub line: usize,
    pub column: usize,
    /// Byte offset into the lexed text.
    pub offset: usize,
    pub message: String,
}

/// Lexes the whole source, stopping at the first error.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).collect()
}

/// Streaming tokenizer. Yields tokens until end of input (the `Eof` token is
/// not yielded) or until the first error, after which it is exhausted.
pub struct Lexer<'a> {
    src: &'a str,
    chars: std::str::Chars<'a>,
    current: Option<char>,
    position: Position,
    previous: Option<Token>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        let mut chars = src.chars();
        let current = chars.next();
        Self {
            src,
            chars,
            current,
            position: Position::new(1, 1, 0),
            previous: None,
            finished: false,
        }
    }

    /// Produces the next token, `Eof` once the input is consumed.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            match self.current {
                Some('#') => self.eat_comment(),
                Some(ch) if ch.is_whitespace() || ch == ';' => {
                    self.bump();
                }
                _ => break,
            }
        }

        let start = self.position;
        let Some(ch) = self.current else {
            return Ok(Token::new(TokenKind::Eof, "", start));
        };

        let token = match ch {
            '{' => self.single(TokenKind::BlockOpen),
            '}' => self.single(TokenKind::BlockClose),
            '(' => self.single(TokenKind::ParenOpen),
            ')' => self.single(TokenKind::ParenClose),
            '[' => self.single(TokenKind::BracketOpen),
            ']' => self.single(TokenKind::BracketClose),
            ',' => self.single(TokenKind::Comma),
            '"' => self.lex_string(),
            _ if self.at_number_start() => self.lex_number()?,
            ch if ch.is_alphabetic() || ch == '_' => self.lex_identifier(),
            ch if Operator::is_operator_char(ch) => self.lex_operator()?,
            ch => {
                return Err(self.error(start, format!("unrecognized character '{ch}'")));
            }
        };
        Ok(token)
    }

    fn bump(&mut self) -> Option<char> {
        if let Some(ch) = self.current {
            if ch == '\n' {
                self.position = Position::new(self.position.line + 1, 1, self.position.offset + 1);
            } else {
                self.position = self.position.advanced(1, ch.len_utf8());
            }
        }
        self.current = self.chars.next();
        self.current
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.clone().nth(n)
    }

    fn error(&self, at: Position, message: impl Into<String>) -> LexError {
        LexError {
            line: at.line,
            column: at.column,
            offset: at.offset,
            message: message.into(),
        }
    }

    fn text_from(&self, start: Position) -> &'a str {
        &self.src[start.offset..self.position.offset]
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.position;
        self.bump();
        Token::new(kind, self.text_from(start), start)
    }

    fn eat_comment(&mut self) {
        while let Some(ch) = self.current {
            if ch == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn at_number_start(&self) -> bool {
        let digit_after_dot = |ch: Option<char>, next: Option<char>| {
            ch == Some('.') && next.is_some_and(|n| n.is_ascii_digit())
        };
        match self.current {
            Some(ch) if ch.is_ascii_digit() => true,
            Some('.') => digit_after_dot(self.current, self.peek()),
            Some('-') => {
                let signed = self.peek().is_some_and(|n| n.is_ascii_digit())
                    || digit_after_dot(self.peek(), self.peek_nth(1));
                signed && !self.previous.as_ref().is_some_and(Token::ends_operand)
            }
            _ => false,
        }
    }

    fn lex_number(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        if self.current == Some('-') {
            self.bump();
        }
        let mut seen_decimal = false;
        while let Some(ch) = self.current {
            if ch.is_ascii_digit() {
                self.bump();
            } else if ch == '.' && !seen_decimal {
                seen_decimal = true;
                self.bump();
            } else {
                break;
            }
        }
        let text = self.text_from(start);
        let value = text
            .parse::<f64>()
            .map_err(|_| self.error(start, format!("invalid numeric literal '{text}'")))?;
        Ok(Token::new(
            TokenKind::Literal(LiteralToken::Number(value)),
            text,
            start,
        ))
    }

    fn lex_identifier(&mut self) -> Token {
        let start = self.position;
        while let Some(ch) = self.current {
            if ch.is_alphanumeric() || ch == '_' {
                self.bump();
            } else {
                break;
            }
        }
        let text = self.text_from(start);
        let kind = match reserved_literal(text) {
            Some(literal) => TokenKind::Literal(literal),
            None => TokenKind::Identifier(text.to_string()),
        };
        Token::new(kind, text, start)
    }

    fn lex_string(&mut self) -> Token {
        let start = self.position;
        self.bump();
        let mut value = String::new();
        while let Some(ch) = self.current {
            match ch {
                '"' => {
                    self.bump();
                    break;
                }
                '\\' if matches!(self.peek(), Some('"') | Some('\\')) => {
                    if let Some(escaped) = self.bump() {
                        value.push(escaped);
                    }
                    self.bump();
                }
                _ => {
                    value.push(ch);
                    self.bump();
                }
            }
        }
        // An unterminated string yields what was read; the normalizer reports it.
        Token::new(
            TokenKind::Literal(LiteralToken::String(value)),
            self.text_from(start),
            start,
        )
    }

    fn lex_operator(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let mut candidate = String::new();
        let mut longest = None;
        let mut lookahead = self.chars.clone();
        let mut ch = self.current;
        for _ in 0..MAX_OPERATOR_LENGTH {
            match ch {
                Some(c) if Operator::is_operator_char(c) => {
                    candidate.push(c);
                    if let Some(op) = Operator::from_symbol(&candidate) {
                        longest = Some((op, candidate.chars().count()));
                    }
                    ch = lookahead.next();
                }
                _ => break,
            }
        }

        let Some((op, len)) = longest else {
            return Err(self.error(start, format!("invalid operator '{candidate}'")));
        };
        for _ in 0..len {
            self.bump();
        }
        Ok(Token::new(
            TokenKind::Operator(op),
            self.text_from(start),
            start,
        ))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok(token) if token.kind == TokenKind::Eof => {
                self.finished = true;
                None
            }
            Ok(token) => {
                self.previous = Some(token.clone());
                Some(Ok(token))
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}
