//! Lexer error type.

use thiserror::Error;

/// A fatal lexical error: invalid encoding or an unrecoverable internal
/// condition. Ordinary lexical mistakes (bad escape, unterminated string,
/// under-indented multi-line-string line, ...) do *not* raise this type —
/// they become an `Invalid` token per the lexer's failure policy;
/// `LexError` is reserved for the upfront encoding decode step.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Line {line}, Column {column}: {message}")]
    InvalidEncoding {
        message: String,
        line: u32,
        column: u32,
    },
}

impl LexError {
    pub fn line(&self) -> u32 {
        match self {
            LexError::InvalidEncoding { line, .. } => *line,
        }
    }

    pub fn column(&self) -> u32 {
        match self {
            LexError::InvalidEncoding { column, .. } => *column,
        }
    }
}
