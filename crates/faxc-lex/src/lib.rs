//! faxc-lex — the Unicode-aware streaming lexer for the Fax language.
//!
//! Turns `(source bytes, encoding)` into a token sequence. The heavy lifting
//! is split across:
//!
//! - [`encoding`] — UTF-8 validation / UTF-16 transcoding up front
//! - [`cursor`] — byte-position tracking over the decoded `&str`
//! - [`unicode`] — identifier-class and digit predicates
//! - [`token`] — `TokenKind`/`Token` and the keyword table
//! - [`lexer`] — the scanner itself
//!
//! ```
//! use faxc_lex::{tokenize_source, Encoding};
//!
//! let tokens = tokenize_source(b"number x = 42;", Encoding::Utf8).unwrap();
//! assert_eq!(tokens.len(), 6); // number, x, =, 42, ;, EOF
//! ```

pub mod cursor;
pub mod encoding;
pub mod error;
pub mod lexer;
pub mod token;
pub mod unicode;

pub use encoding::Encoding;
pub use error::LexError;
pub use lexer::Lexer;
pub use token::{Token, TokenKind};

/// Decodes `source` per `encoding` and tokenizes it to completion.
///
/// This is the top-level entry point a driver calls; it fails only on an
/// encoding error — ordinary lexical mistakes
/// become `Invalid` tokens within the returned vector rather than an `Err`.
pub fn tokenize_source(source: &[u8], encoding: Encoding) -> Result<Vec<Token>, LexError> {
    let decoded = encoding::decode(source, encoding)?;
    Ok(lexer::tokenize(&decoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_source_round_trip() {
        let tokens = tokenize_source(b"number x = 42;", Encoding::Utf8).unwrap();
        assert_eq!(tokens.last().unwrap().kind, TokenKind::EndOfFile);
    }

    #[test]
    fn tokenize_source_propagates_encoding_error() {
        let bytes = [0xffu8, 0xfe];
        assert!(tokenize_source(&bytes, Encoding::Utf8).is_err());
    }
}
