//! Parser error type.

use thiserror::Error;

/// A syntax error: unexpected token, missing punctuation, or a malformed
/// declaration. Carries the 1-based line/column of the offending
/// token; raising one always triggers panic-mode recovery at the nearest
/// statement boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Line {line}, Column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        ParseError {
            message: message.into(),
            line,
            column,
        }
    }
}
