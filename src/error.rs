use crate::language::errors::SyntaxError;
use crate::runtime::error::RuntimeError;
use std::path::PathBuf;
use thiserror::Error;

/// Everything a script run can fail with.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}
