use crate::language::{
    lexer::LexError,
    normalizer::NormalizedLine,
    span::{Position, Span},
};
use miette::SourceSpan;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SyntaxErrorKind {
    #[error("unclosed string literal")]
    UnclosedString,
    #[error("unmatched closing brace")]
    UnmatchedClosingBrace,
    #[error("unmatched opening brace")]
    UnmatchedOpeningBrace,
    #[error("unbalanced parentheses")]
    UnbalancedParens,
    #[error("block without preceding action")]
    BlockWithoutAction,
    #[error("invalid line `{0}`")]
    InvalidLine(String),
    #[error("invalid call `{0}`")]
    InvalidCall(String),
    #[error("unknown character '{0}' in expression")]
    UnknownCharacter(char),
    #[error("undefined action `{0}`")]
    UndefinedAction(String),
    #[error("invalid expression: {0}")]
    InvalidExpression(String),
    #[error("{0}")]
    Lex(String),
}

#[derive(Clone, Debug, Error, PartialEq)]
#[error("{kind} at line {}, column {}", .span.line(), .span.column())]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub span: Span,
    pub help: Option<String>,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            help: None,
        }
    }

    pub fn at(kind: SyntaxErrorKind, position: Position) -> Self {
        Self::new(kind, Span::new(position, 1))
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Rebases a lexer error found in a normalized line onto the raw source.
    pub fn from_lex(err: LexError, line: &NormalizedLine) -> Self {
        Self::at(SyntaxErrorKind::Lex(err.message), line.position_at(err.offset))
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn to_source_span(&self) -> SourceSpan {
        self.span.to_source_span()
    }
}
