//! Type parsing: basic (named), array, and tuple types.

use crate::ast::{BasicTypeName, Type};
use crate::{ParseError, Parser};
use faxc_lex::{Token, TokenKind};

fn basic_type_name(kind: TokenKind) -> Option<BasicTypeName> {
    Some(match kind {
        TokenKind::Object => BasicTypeName::Object,
        TokenKind::None => BasicTypeName::None,
        TokenKind::Char => BasicTypeName::Char,
        TokenKind::Character => BasicTypeName::Character,
        TokenKind::String => BasicTypeName::String,
        TokenKind::Number => BasicTypeName::Number,
        TokenKind::Integer => BasicTypeName::Integer,
        TokenKind::Decimal => BasicTypeName::Decimal,
        TokenKind::Bool => BasicTypeName::Bool,
        TokenKind::Tribool => BasicTypeName::Tribool,
        TokenKind::Bit => BasicTypeName::Bit,
        TokenKind::Byte => BasicTypeName::Byte,
        TokenKind::Word => BasicTypeName::Word,
        TokenKind::Dword => BasicTypeName::Dword,
        TokenKind::Void => BasicTypeName::Void,
        _ => return None,
    })
}

impl<'a> Parser<'a> {
    /// Parses a type annotation. The grammar's `TYPE` terminal is one of
    /// the type keywords; this parser additionally recognizes `TYPE[]` as
    /// an array type and `(TYPE, TYPE, ...)` as a tuple type, both needed
    /// to round-trip the `Type` AST variants.
    pub(crate) fn parse_type(&mut self) -> Result<Type, ParseError> {
        if self.check(TokenKind::LParen) {
            return self.parse_tuple_type();
        }

        let token: Token = self.current_token();
        let name = basic_type_name(token.kind)
            .ok_or_else(|| self.error_at_current("expected a type"))?;
        self.advance();
        let mut ty = Type::Basic(name, token);

        while self.check(TokenKind::LBracket) {
            self.advance();
            self.expect(TokenKind::RBracket, "expected ']' after '[' in array type")?;
            ty = Type::Array(Box::new(ty));
        }

        Ok(ty)
    }

    fn parse_tuple_type(&mut self) -> Result<Type, ParseError> {
        self.advance(); // consume '('
        let mut elements = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                elements.push(self.parse_type()?);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "expected ')' after tuple type")?;
        Ok(Type::Tuple(elements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_type() {
        let mut parser = Parser::new("number");
        let ty = parser.parse_type().unwrap();
        assert!(matches!(ty, Type::Basic(BasicTypeName::Number, _)));
    }

    #[test]
    fn parses_array_type() {
        let mut parser = Parser::new("number[]");
        let ty = parser.parse_type().unwrap();
        assert!(matches!(ty, Type::Array(_)));
    }

    #[test]
    fn parses_tuple_type() {
        let mut parser = Parser::new("(number, string)");
        let ty = parser.parse_type().unwrap();
        match ty {
            Type::Tuple(elements) => assert_eq!(elements.len(), 2),
            _ => panic!("expected tuple type"),
        }
    }

    #[test]
    fn rejects_non_type_token() {
        let mut parser = Parser::new("123");
        assert!(parser.parse_type().is_err());
    }
}
