use crate::language::span::Position;
use std::fmt;

/// Longest operator spelling the lexer tries before falling back to a single
/// character. Raise it when adding a longer operator.
pub const MAX_OPERATOR_LENGTH: usize = 4;

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw text as it appears in the source.
    pub value: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            value: value.into(),
            position,
        }
    }

    /// Byte offset just past the token, relative to the lexed text.
    pub fn end(&self) -> usize {
        self.position.offset + self.value.len()
    }

    /// Whether a `-` directly after this token is a binary operator rather
    /// than the sign of a number.
    pub fn ends_operand(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Identifier(_)
                | TokenKind::Literal(_)
                | TokenKind::ParenClose
                | TokenKind::BracketClose
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    Operator(Operator),
    Literal(LiteralToken),

    BlockOpen,
    BlockClose,
    ParenOpen,
    ParenClose,
    BracketOpen,
    BracketClose,
    Comma,

    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(name) => write!(f, "identifier `{name}`"),
            TokenKind::Operator(op) => write!(f, "operator `{op}`"),
            TokenKind::Literal(literal) => write!(f, "{literal}"),
            TokenKind::BlockOpen => write!(f, "`{{`"),
            TokenKind::BlockClose => write!(f, "`}}`"),
            TokenKind::ParenOpen => write!(f, "`(`"),
            TokenKind::ParenClose => write!(f, "`)`"),
            TokenKind::BracketOpen => write!(f, "`[`"),
            TokenKind::BracketClose => write!(f, "`]`"),
            TokenKind::Comma => write!(f, "`,`"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LiteralToken {
    Number(f64),
    String(String),
    Boolean(bool),
    Nil,
}

impl fmt::Display for LiteralToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralToken::Number(value) => write!(f, "number {value}"),
            LiteralToken::String(value) => write!(f, "string {value:?}"),
            LiteralToken::Boolean(value) => write!(f, "boolean {value}"),
            LiteralToken::Nil => write!(f, "nil"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Exponent,

    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    ModuloAssign,
    ExponentAssign,

    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    And,
    Or,
    Not,
    Xor,

    Assign,
    Declare,
    Dot,
}

const OPERATORS: &[(Operator, &str)] = &[
    (Operator::Add, "+"),
    (Operator::Subtract, "-"),
    (Operator::Multiply, "*"),
    (Operator::Divide, "/"),
    (Operator::Modulo, "%"),
    (Operator::Exponent, "^"),
    (Operator::AddAssign, "+="),
    (Operator::SubtractAssign, "-="),
    (Operator::MultiplyAssign, "*="),
    (Operator::DivideAssign, "/="),
    (Operator::ModuloAssign, "%="),
    (Operator::ExponentAssign, "^="),
    (Operator::Equal, "=="),
    (Operator::NotEqual, "!="),
    (Operator::Less, "<"),
    (Operator::LessEqual, "<="),
    (Operator::Greater, ">"),
    (Operator::GreaterEqual, ">="),
    (Operator::And, "&&"),
    (Operator::Or, "||"),
    (Operator::Not, "!"),
    (Operator::Xor, "^^"),
    (Operator::Assign, "="),
    (Operator::Declare, ":="),
    (Operator::Dot, "."),
];

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        OPERATORS
            .iter()
            .find(|(_, spelling)| *spelling == symbol)
            .map(|(op, _)| *op)
    }

    pub fn symbol(self) -> &'static str {
        OPERATORS
            .iter()
            .find(|(op, _)| *op == self)
            .map(|(_, spelling)| *spelling)
            .unwrap_or("?")
    }

    /// Characters that may appear inside an operator spelling.
    pub fn is_operator_char(ch: char) -> bool {
        OPERATORS
            .iter()
            .any(|(_, spelling)| spelling.contains(ch))
    }

    /// The arithmetic operator behind an augmented assignment (`+=` -> `+`).
    pub fn augmented_base(self) -> Option<Operator> {
        match self {
            Operator::AddAssign => Some(Operator::Add),
            Operator::SubtractAssign => Some(Operator::Subtract),
            Operator::MultiplyAssign => Some(Operator::Multiply),
            Operator::DivideAssign => Some(Operator::Divide),
            Operator::ModuloAssign => Some(Operator::Modulo),
            Operator::ExponentAssign => Some(Operator::Exponent),
            _ => None,
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Operator::Add
                | Operator::Subtract
                | Operator::Multiply
                | Operator::Divide
                | Operator::Modulo
                | Operator::Exponent
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Operator::Equal
                | Operator::NotEqual
                | Operator::Less
                | Operator::LessEqual
                | Operator::Greater
                | Operator::GreaterEqual
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(
            self,
            Operator::And | Operator::Or | Operator::Not | Operator::Xor
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Words the lexer turns into literals instead of identifiers.
pub fn reserved_literal(word: &str) -> Option<LiteralToken> {
    match word {
        "true" => Some(LiteralToken::Boolean(true)),
        "false" => Some(LiteralToken::Boolean(false)),
        "nil" => Some(LiteralToken::Nil),
        _ => None,
    }
}
