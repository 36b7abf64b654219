//! Expression parsing: precedence climbing, extended with the bitwise
//! operators and tuple literals the token set and AST call for. Binary
//! operators are left-associative; assignment and unary are
//! right-associative.
//!
//! ```text
//! assignment := IDENT "=" assignment | logicalOr
//! logicalOr   := logicalAnd ( "||" logicalAnd )*
//! logicalAnd  := bitOr ( "&&" bitOr )*
//! bitOr       := bitXor ( "|" bitXor )*
//! bitXor      := bitAnd ( "^" bitAnd )*
//! bitAnd      := equality ( "&" equality )*
//! equality    := comparison ( ("==" | "!=") comparison )*
//! comparison  := shift ( ("<" | "<=" | ">" | ">=") shift )*
//! shift       := term ( ("<<" | ">>") term )*
//! term        := factor ( ("+" | "-") factor )*
//! factor      := unary ( ("*" | "/" | "%") unary )*
//! unary       := ( "!" | "-" | "~" ) unary | call
//! call        := primary ( "(" arguments? ")" | "." INTEGER )*
//! primary     := LITERAL | IDENT | "(" expression ( "," expression )* ")"
//! ```

use crate::ast::{
    AssignmentExpr, BinOp, BinaryExpr, CallExpr, Expr, IdentifierExpr, LiteralExpr, LiteralValue,
    TupleExpr, TupleMemberExpr, UnaryExpr, UnaryOp,
};
use crate::{ParseError, Parser, MAX_ARGS};
use faxc_lex::TokenKind;

macro_rules! left_assoc_level {
    ($name:ident, $next:ident, [$($kind:pat => $op:expr),+ $(,)?]) => {
        fn $name(&mut self) -> Result<Expr, ParseError> {
            let mut left = self.$next()?;
            loop {
                let op = match self.current_token().kind {
                    $($kind => $op,)+
                    _ => break,
                };
                let op_token = self.advance();
                let right = self.$next()?;
                left = Expr::Binary(BinaryExpr {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                    op_token,
                });
            }
            Ok(left)
        }
    };
}

impl<'a> Parser<'a> {
    pub(crate) fn expression(&mut self) -> Result<Expr, ParseError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, ParseError> {
        if self.check(TokenKind::Identifier) && self.peek_next_kind() == Some(TokenKind::Assign) {
            let name_token = self.advance();
            self.advance(); // consume '='
            let value = self.assignment()?;
            return Ok(Expr::Assignment(AssignmentExpr {
                name: name_token.lexeme,
                target_token: name_token,
                value: Box::new(value),
            }));
        }
        self.logical_or()
    }

    left_assoc_level!(logical_or, logical_and, [TokenKind::OrOr => BinOp::Or]);
    left_assoc_level!(logical_and, bit_or, [TokenKind::AndAnd => BinOp::And]);
    left_assoc_level!(bit_or, bit_xor, [TokenKind::Pipe => BinOp::BitOr]);
    left_assoc_level!(bit_xor, bit_and, [TokenKind::Caret => BinOp::BitXor]);
    left_assoc_level!(bit_and, equality, [TokenKind::Amp => BinOp::BitAnd]);
    left_assoc_level!(equality, comparison, [
        TokenKind::EqEq => BinOp::Eq,
        TokenKind::NotEq => BinOp::Ne,
    ]);
    left_assoc_level!(comparison, shift, [
        TokenKind::Lt => BinOp::Lt,
        TokenKind::LtEq => BinOp::Le,
        TokenKind::Gt => BinOp::Gt,
        TokenKind::GtEq => BinOp::Ge,
    ]);
    left_assoc_level!(shift, term, [
        TokenKind::Shl => BinOp::Shl,
        TokenKind::Shr => BinOp::Shr,
    ]);
    left_assoc_level!(term, factor, [
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
    ]);
    left_assoc_level!(factor, unary, [
        TokenKind::Star => BinOp::Mul,
        TokenKind::Slash => BinOp::Div,
        TokenKind::Percent => BinOp::Mod,
    ]);

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current_token().kind {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Tilde => UnaryOp::BitNot,
            _ => return self.call(),
        };
        let op_token = self.advance();
        let operand = self.unary()?;
        Ok(Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
            op_token,
        }))
    }

    fn call(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        loop {
            if self.check(TokenKind::LParen) {
                expr = self.finish_call(expr)?;
            } else if self.check(TokenKind::Dot) {
                self.advance();
                let index_token =
                    self.expect(TokenKind::LiteralNumber, "expected tuple index after '.'")?;
                let index: u32 = index_token.lexeme_str().parse().map_err(|_| {
                    ParseError::new(
                        "tuple index must be a non-negative integer",
                        index_token.line,
                        index_token.column,
                    )
                })?;
                expr = Expr::TupleMember(TupleMemberExpr {
                    tuple: Box::new(expr),
                    index,
                    dot_token: index_token,
                });
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        let paren_token = self.advance();
        let mut arguments = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                if arguments.len() >= MAX_ARGS {
                    return Err(ParseError::new(
                        format!("call exceeds the maximum of {MAX_ARGS} arguments"),
                        paren_token.line,
                        paren_token.column,
                    ));
                }
                arguments.push(self.expression()?);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "expected ')' after arguments")?;
        Ok(Expr::Call(CallExpr {
            callee: Box::new(callee),
            arguments,
            paren_token,
        }))
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current_token();
        match token.kind {
            TokenKind::LiteralNumber => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr {
                    value: LiteralValue::Number(token.lexeme),
                    token,
                }))
            }
            TokenKind::LiteralString => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr {
                    value: LiteralValue::Str(token.lexeme),
                    token,
                }))
            }
            TokenKind::LiteralChar => {
                self.advance();
                let c = token.lexeme_str().chars().next().unwrap_or('\0');
                Ok(Expr::Literal(LiteralExpr {
                    value: LiteralValue::Char(c),
                    token,
                }))
            }
            TokenKind::LiteralCharacter => {
                self.advance();
                let c = token.lexeme_str().chars().next().unwrap_or('\0');
                Ok(Expr::Literal(LiteralExpr {
                    value: LiteralValue::Character(c),
                    token,
                }))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr {
                    value: LiteralValue::Bool(true),
                    token,
                }))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr {
                    value: LiteralValue::Bool(false),
                    token,
                }))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr {
                    value: LiteralValue::Null,
                    token,
                }))
            }
            TokenKind::Unset => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr {
                    value: LiteralValue::Unset,
                    token,
                }))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::Identifier(IdentifierExpr {
                    name: token.lexeme,
                    token,
                }))
            }
            TokenKind::LParen => self.parenthesized_or_tuple(),
            _ => Err(self.error_at_current("expected expression")),
        }
    }

    fn parenthesized_or_tuple(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance(); // consume '('
        let mut elements = vec![self.expression()?];
        let mut is_tuple = false;
        while self.match_kind(TokenKind::Comma) {
            is_tuple = true;
            if self.check(TokenKind::RParen) {
                break;
            }
            elements.push(self.expression()?);
        }
        self.expect(TokenKind::RParen, "expected ')' after expression")?;
        if is_tuple {
            Ok(Expr::Tuple(TupleExpr { elements, token }))
        } else {
            Ok(elements.into_iter().next().unwrap())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Printer;

    fn parse_expr(src: &str) -> Expr {
        let mut parser = Parser::new(src);
        parser.expression().unwrap()
    }

    #[test]
    fn precedence_multiplication_over_addition() {
        let expr = parse_expr("42 + x * 3");
        assert_eq!(Printer::print_expr(&expr), "(42+(x*3))");
    }

    #[test]
    fn assignment_is_right_associative() {
        let expr = parse_expr("x = y = 1");
        assert_eq!(Printer::print_expr(&expr), "(x=(y=1))");
    }

    #[test]
    fn unary_is_right_associative() {
        let expr = parse_expr("- - x");
        assert_eq!(Printer::print_expr(&expr), "(-(-x))");
    }

    #[test]
    fn call_parses_arguments() {
        let expr = parse_expr("add(1, 2)");
        assert_eq!(Printer::print_expr(&expr), "add(1,2)");
    }

    #[test]
    fn tuple_literal_and_member_access() {
        let expr = parse_expr("(1, 2).0");
        assert_eq!(Printer::print_expr(&expr), "(1,2).0");
    }

    #[test]
    fn parenthesized_single_expr_is_not_a_tuple() {
        let expr = parse_expr("(1 + 2) * 3");
        assert_eq!(Printer::print_expr(&expr), "((1+2)*3)");
    }
}
