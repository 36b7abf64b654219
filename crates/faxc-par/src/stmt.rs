//! Statement parsing: blocks, `if`/`while`/`for`, `return`/`break`/`continue`,
//! expression statements, and the `funcDecl`/`classDecl` declaration forms
//!.

use crate::ast::{
    BlockStmt, BreakStmt, ClassDeclStmt, ContinueStmt, ExprStmt, ForInit, ForStmt, FuncDeclStmt,
    IfStmt, Param, ReturnStmt, Stmt, Type, VarDeclStmt, WhileStmt,
};
use crate::{ParseError, Parser, MAX_PARAMS};
use faxc_lex::{Token, TokenKind};

impl<'a> Parser<'a> {
    /// `statement := block | ifStmt | whileStmt | forStmt
    ///             | returnStmt | breakStmt | continueStmt | exprStmt`
    pub(crate) fn statement(&mut self) -> Result<Stmt, ParseError> {
        match self.current_token().kind {
            TokenKind::LBrace => self.block_statement(),
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::For => self.for_statement(),
            TokenKind::Return => self.return_statement(),
            TokenKind::Break => {
                let token = self.advance();
                self.expect(TokenKind::Semicolon, "expected ';' after 'break'")?;
                Ok(Stmt::Break(BreakStmt { token }))
            }
            TokenKind::Continue => {
                let token = self.advance();
                self.expect(TokenKind::Semicolon, "expected ';' after 'continue'")?;
                Ok(Stmt::Continue(ContinueStmt { token }))
            }
            _ => self.expr_statement(),
        }
    }

    fn expr_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.expression()?;
        self.expect(TokenKind::Semicolon, "expected ';' after expression")?;
        Ok(Stmt::Expr(ExprStmt { expr }))
    }

    /// `block := "{" declaration* "}"`
    pub(crate) fn block_statement(&mut self) -> Result<Stmt, ParseError> {
        let brace_token = self.advance(); // consume '{'
        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::EndOfFile) {
            statements.push(self.declaration_in_block()?);
        }
        self.expect(TokenKind::RBrace, "expected '}' after block")?;
        Ok(Stmt::Block(BlockStmt {
            statements,
            brace_token,
        }))
    }

    /// A `declaration` inside a block, with the same panic-mode recovery
    /// the top level uses: a single malformed member does not abort the
    /// rest of the enclosing block.
    fn declaration_in_block(&mut self) -> Result<Stmt, ParseError> {
        match self.declaration_inner() {
            Ok(stmt) => Ok(stmt),
            Err(err) => {
                self.synchronize();
                Err(err)
            }
        }
    }

    /// Shared by `parse_program`/block parsing: `declaration := varDecl |
    /// funcDecl | classDecl | statement`.
    pub(crate) fn declaration_inner(&mut self) -> Result<Stmt, ParseError> {
        if self.check(TokenKind::Class) {
            return self.class_declaration();
        }
        if self.check(TokenKind::Const) || self.current_token().kind.is_type_keyword() {
            return self.var_or_func_declaration_inner();
        }
        self.statement()
    }

    fn var_or_func_declaration_inner(&mut self) -> Result<Stmt, ParseError> {
        let is_const = self.match_kind(TokenKind::Const);
        let ty = self.parse_type()?;
        let name_token = self.expect(TokenKind::Identifier, "expected identifier")?;
        let name = name_token.lexeme;

        if !is_const && self.check(TokenKind::LParen) {
            return self.finish_func_declaration(ty, name, name_token);
        }

        let initializer = if self.match_kind(TokenKind::Assign) {
            Some(self.expression()?)
        } else {
            None
        };
        if is_const && initializer.is_none() {
            return Err(self.error_at_previous("const declaration requires an initializer"));
        }
        self.expect(
            TokenKind::Semicolon,
            "expected ';' after variable declaration",
        )?;
        Ok(Stmt::VarDecl(VarDeclStmt {
            is_const,
            ty,
            name,
            name_token,
            initializer,
        }))
    }

    /// `funcDecl := TYPE IDENT "(" params? ")" block`
    pub(crate) fn finish_func_declaration(
        &mut self,
        ret_type: Type,
        name: faxc_util::Symbol,
        name_token: Token,
    ) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::LParen, "expected '(' after function name")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                if params.len() >= MAX_PARAMS {
                    return Err(self.error_at_current(&format!(
                        "function exceeds the maximum of {MAX_PARAMS} parameters"
                    )));
                }
                let param_ty = self.parse_type()?;
                let param_name_token =
                    self.expect(TokenKind::Identifier, "expected parameter name")?;
                params.push(Param {
                    ty: param_ty,
                    name: param_name_token.lexeme,
                    name_token: param_name_token,
                });
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "expected ')' after parameters")?;
        let body = match self.block_statement()? {
            Stmt::Block(block) => block,
            _ => unreachable!("block_statement always produces Stmt::Block"),
        };
        Ok(Stmt::FuncDecl(FuncDeclStmt {
            ret_type,
            name,
            name_token,
            params,
            body,
        }))
    }

    /// `classDecl := "class" IDENT "{" ( varDecl | funcDecl )* "}"`.
    /// Follows the same member grammar as a block.
    pub(crate) fn class_declaration(&mut self) -> Result<Stmt, ParseError> {
        let class_token = self.advance(); // consume 'class'
        let name_token = self.expect(TokenKind::Identifier, "expected class name")?;
        self.expect(TokenKind::LBrace, "expected '{' after class name")?;
        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::EndOfFile) {
            members.push(self.declaration_in_block()?);
        }
        self.expect(TokenKind::RBrace, "expected '}' after class body")?;
        let _ = class_token;
        Ok(Stmt::ClassDecl(ClassDeclStmt {
            name: name_token.lexeme,
            name_token,
            members,
        }))
    }

    /// `ifStmt := "if" "(" expression ")" statement ( "else" statement )?`
    fn if_statement(&mut self) -> Result<Stmt, ParseError> {
        let if_token = self.advance();
        self.expect(TokenKind::LParen, "expected '(' after 'if'")?;
        let condition = self.expression()?;
        self.expect(TokenKind::RParen, "expected ')' after condition")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_kind(TokenKind::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If(IfStmt {
            condition,
            then_branch,
            else_branch,
            if_token,
        }))
    }

    /// `whileStmt := "while" "(" expression ")" statement`
    fn while_statement(&mut self) -> Result<Stmt, ParseError> {
        let while_token = self.advance();
        self.expect(TokenKind::LParen, "expected '(' after 'while'")?;
        let condition = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenKind::RParen, "expected ')' after condition")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While(WhileStmt {
            condition,
            body,
            while_token,
        }))
    }

    /// `forStmt := "for" "(" ( varDecl | exprStmt | ";" ) expression? ";" expression? ")" statement`
    fn for_statement(&mut self) -> Result<Stmt, ParseError> {
        let for_token = self.advance();
        self.expect(TokenKind::LParen, "expected '(' after 'for'")?;

        let init = if self.match_kind(TokenKind::Semicolon) {
            ForInit::None
        } else if self.check(TokenKind::Const) || self.current_token().kind.is_type_keyword() {
            match self.var_or_func_declaration_inner()? {
                Stmt::VarDecl(decl) => ForInit::VarDecl(decl),
                _ => return Err(self.error_at_previous("expected variable declaration in 'for'")),
            }
        } else {
            let expr = self.expression()?;
            self.expect(TokenKind::Semicolon, "expected ';' after for-initializer")?;
            ForInit::Expr(ExprStmt { expr })
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenKind::Semicolon, "expected ';' after loop condition")?;

        let increment = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenKind::RParen, "expected ')' after for clauses")?;

        let body = Box::new(self.statement()?);
        Ok(Stmt::For(ForStmt {
            init: Box::new(init),
            condition,
            increment,
            body,
            for_token,
        }))
    }

    /// `returnStmt := "return" expression? ";"`
    fn return_statement(&mut self) -> Result<Stmt, ParseError> {
        let return_token = self.advance();
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenKind::Semicolon, "expected ';' after return value")?;
        Ok(Stmt::Return(ReturnStmt {
            value,
            return_token,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Printer;

    fn parse_one(src: &str) -> Stmt {
        let mut parser = Parser::new(src);
        parser.parse().unwrap()
    }

    #[test]
    fn parses_var_decl() {
        let stmt = parse_one("number x = 42;");
        assert!(matches!(stmt, Stmt::VarDecl(_)));
    }

    #[test]
    fn parses_const_requires_initializer() {
        let mut parser = Parser::new("const number x;");
        assert!(parser.parse().is_err());
    }

    #[test]
    fn parses_function_declaration() {
        let stmt = parse_one("number add(number a, number b) { return a + b; }");
        match &stmt {
            Stmt::FuncDecl(f) => assert_eq!(f.params.len(), 2),
            _ => panic!("expected FuncDecl"),
        }
    }

    #[test]
    fn parses_if_else() {
        let stmt = parse_one("if (x) { y = 1; } else { y = 2; }");
        assert!(matches!(stmt, Stmt::If(_)));
    }

    #[test]
    fn parses_for_loop() {
        let stmt = parse_one("for (number i = 0; i < 10; i = i + 1) { sum = sum + i; }");
        assert!(matches!(stmt, Stmt::For(_)));
    }

    #[test]
    fn parses_while_with_no_condition() {
        let stmt = parse_one("while () { break; }");
        match stmt {
            Stmt::While(w) => assert!(w.condition.is_none()),
            _ => panic!("expected While"),
        }
    }

    #[test]
    fn parses_class_declaration() {
        let stmt = parse_one("class Point { number x = 0; number y = 0; }");
        match stmt {
            Stmt::ClassDecl(c) => assert_eq!(c.members.len(), 2),
            _ => panic!("expected ClassDecl"),
        }
    }

    #[test]
    fn program_and_print_round_trip() {
        let mut parser = Parser::new("42 + x * 3;");
        let output = parser.parse_program();
        assert!(output.errors.is_empty());
        assert_eq!(Printer::print_program(&output.statements), "(42+(x*3));");
    }

    #[test]
    fn panic_mode_recovers_after_bad_statement() {
        let mut parser = Parser::new("number = ; number y = 1;");
        let output = parser.parse_program();
        assert!(!output.errors.is_empty());
    }
}
