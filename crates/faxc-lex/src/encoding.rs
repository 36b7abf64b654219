//! Source encoding detection and decoding.
//!
//! The lexer accepts raw bytes tagged with an [`Encoding`]; decoding to a
//! validated `String` happens once, up front, so the rest of the lexer can
//! work over plain `&str` via [`crate::cursor::Cursor`].

use crate::LexError;

/// The encoding of a source buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8 (the common case).
    Utf8,
    /// UTF-16, native-endian code units packed two bytes per unit.
    Utf16,
}

/// Decodes a raw byte buffer into a validated UTF-8 `String`, reporting the
/// line/column of the first invalid sequence on failure.
pub fn decode(source: &[u8], encoding: Encoding) -> Result<String, LexError> {
    match encoding {
        Encoding::Utf8 => decode_utf8(source),
        Encoding::Utf16 => decode_utf16(source),
    }
}

fn decode_utf8(source: &[u8]) -> Result<String, LexError> {
    match std::str::from_utf8(source) {
        Ok(s) => Ok(s.to_owned()),
        Err(e) => {
            let (line, column) = line_col_at_byte(source, e.valid_up_to());
            Err(LexError::InvalidEncoding {
                message: "Invalid UTF-8".to_string(),
                line,
                column,
            })
        }
    }
}

fn decode_utf16(source: &[u8]) -> Result<String, LexError> {
    // Pack the byte buffer into 16-bit code units (native endianness) and
    // let `char::decode_utf16` handle surrogate-pair reassembly; a lone
    // surrogate is reported as an invalid sequence.
    let mut units = Vec::with_capacity(source.len() / 2);
    let mut chunks = source.chunks_exact(2);
    for chunk in &mut chunks {
        units.push(u16::from_ne_bytes([chunk[0], chunk[1]]));
    }
    if !chunks.remainder().is_empty() {
        return Err(LexError::InvalidEncoding {
            message: "Truncated UTF-16 code unit at end of input".to_string(),
            line: 1,
            column: 1,
        });
    }

    let mut out = String::with_capacity(units.len());
    let mut line = 1u32;
    let mut column = 1u32;
    for (i, result) in char::decode_utf16(units.iter().copied()).enumerate() {
        match result {
            Ok(c) => {
                out.push(c);
                if c == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
            }
            Err(_) => {
                return Err(LexError::InvalidEncoding {
                    message: format!("Unpaired UTF-16 surrogate at code unit {i}"),
                    line,
                    column,
                });
            }
        }
    }
    Ok(out)
}

fn line_col_at_byte(source: &[u8], offset: usize) -> (u32, u32) {
    let mut line = 1u32;
    let mut column = 1u32;
    for &b in &source[..offset.min(source.len())] {
        if b == b'\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}
