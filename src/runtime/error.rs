use crate::language::token::Operator;
use crate::runtime::value::VariableType;
use thiserror::Error;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum RuntimeError {
    #[error("Undefined variable `{name}`")]
    UndefinedVariable { name: String },
    #[error("Action `{name}` expected {expected} arguments but received {received}")]
    ArityMismatch {
        name: String,
        expected: String,
        received: usize,
    },
    #[error("Type mismatch: {message}")]
    TypeMismatch { message: String },
    #[error("Operator `{operator}` is not supported for strings")]
    StringOperator { operator: Operator },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Cannot convert {from} to {to}")]
    Conversion { from: VariableType, to: VariableType },
    #[error("Cannot parse \"{text}\" as {to}")]
    Unparsable { text: String, to: VariableType },
    #[error("Invalid literal `{text}`")]
    InvalidLiteral { text: String },
    #[error("Malformed expression: {message}")]
    MalformedExpression { message: String },
    #[error("Validation failed: {message}")]
    Validation { message: String },
    #[error("Operation not supported: {message}")]
    Unsupported { message: String },
    #[error("Action `{name}` failed: {message}")]
    Action { name: String, message: String },
    #[error("{source} (line {line})")]
    At {
        line: usize,
        source: Box<RuntimeError>,
    },
}

impl RuntimeError {
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        RuntimeError::TypeMismatch {
            message: message.into(),
        }
    }

    pub fn arity(name: &str, expected: impl Into<String>, received: usize) -> Self {
        RuntimeError::ArityMismatch {
            name: name.to_string(),
            expected: expected.into(),
            received,
        }
    }

    /// Attaches the source line. An error that already carries a line keeps it.
    pub fn at(self, line: usize) -> Self {
        match self {
            RuntimeError::At { .. } => self,
            other => RuntimeError::At {
                line,
                source: Box::new(other),
            },
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            RuntimeError::At { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// The error without its positional wrapper.
    pub fn root(&self) -> &RuntimeError {
        match self {
            RuntimeError::At { source, .. } => source.root(),
            other => other,
        }
    }
}
