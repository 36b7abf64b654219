//! Semantic error type.

use thiserror::Error;

/// A semantic-analysis error: undefined name, duplicate definition, type
/// mismatch, invalid operator operands, constant reassignment, use before
/// initialization, return-outside-function, break/continue outside a loop.
/// Carries the 1-based line/column of the offending token.
///
/// Unlike [`faxc_par::ParseError`], a `SemanticError` never aborts
/// analysis by itself — the analyzer collects up to `MAX_ERRORS` of these
/// and keeps walking.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Line {line}, Column {column}: {message}")]
pub struct SemanticError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl SemanticError {
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        SemanticError {
            message: message.into(),
            line,
            column,
        }
    }
}
