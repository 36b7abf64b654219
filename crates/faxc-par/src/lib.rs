//! faxc-par — the recursive-descent parser for the Fax language.
//!
//! Turns a token stream into the [`ast`] tree defined in this crate. The
//! grammar is a standard precedence-climbing expression grammar
//! layered under C-like statements and declarations; errors raise
//! [`error::ParseError`] and trigger panic-mode recovery at the next
//! statement or declaration boundary.

pub mod ast;
pub mod error;
pub mod expr;
pub mod stmt;
pub mod types;

pub use ast::{
    AssignmentExpr, BasicTypeName, BinOp, BinaryExpr, BlockStmt, BreakStmt, CallExpr,
    ClassDeclStmt, ContinueStmt, Expr, ExprStmt, ExprVisitor, ForInit, ForStmt, FuncDeclStmt,
    IdentifierExpr, IfStmt, LiteralExpr, LiteralValue, Param, Printer, ReturnStmt, Stmt, StmtVisitor,
    Type, TupleExpr, TupleMemberExpr, UnaryExpr, UnaryOp, VarDeclStmt, WhileStmt,
};
pub use error::ParseError;

use faxc_lex::{Lexer, Token, TokenKind};

/// At most this many parameters are accepted per function.
pub const MAX_PARAMS: usize = 255;
/// At most this many arguments are accepted per call.
pub const MAX_ARGS: usize = 255;

/// The result of parsing a whole program: the statements that were
/// recovered plus every error encountered along the way. A non-empty
/// `errors` does not mean `statements` is empty — panic-mode recovery
/// keeps going after each error, synchronizing at the next statement
/// boundary.
#[derive(Debug, Default)]
pub struct ParseOutput {
    pub statements: Vec<Stmt>,
    pub errors: Vec<ParseError>,
}

/// Recursive-descent parser over a pre-tokenized source.
///
/// The parser owns its lookahead (`current_token`/`previous_token`) and
/// pulls from the lexer on demand rather than materializing the whole
/// token vector up front, mirroring the lexer's own streaming contract.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    previous: Token,
    had_error: bool,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        let dummy_previous = current;
        Parser {
            lexer,
            current,
            previous: dummy_previous,
            had_error: false,
            errors: Vec::new(),
        }
    }

    /// Parses the whole program: zero or more declarations until EOF
    ///.
    pub fn parse_program(mut self) -> ParseOutput {
        let mut statements = Vec::new();
        while !self.check(TokenKind::EndOfFile) {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.had_error = true;
                    self.synchronize();
                }
            }
        }
        ParseOutput {
            statements,
            errors: self.errors,
        }
    }

    /// Parses a single statement or declaration, for REPL-style use
    ///.
    pub fn parse(&mut self) -> Result<Stmt, ParseError> {
        self.declaration()
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    // -- lookahead -----------------------------------------------------

    pub(crate) fn current_token(&self) -> Token {
        self.current
    }

    pub(crate) fn previous_token(&self) -> Token {
        self.previous
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        self.previous = self.current;
        if !self.check(TokenKind::EndOfFile) {
            self.current = self.lexer.next_token();
        }
        self.previous
    }

    /// Peeks the token kind after `current` without consuming anything,
    /// by delegating to the lexer's own non-consuming `peek_token`
    /// (`current` having already been pulled off the lexer is exactly
    /// the one-token buffer this needs).
    pub(crate) fn peek_next_kind(&mut self) -> Option<TokenKind> {
        if self.check(TokenKind::EndOfFile) {
            return None;
        }
        Some(self.lexer.peek_token().kind)
    }

    pub(crate) fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(message))
        }
    }

    pub(crate) fn error_at_current(&self, message: &str) -> ParseError {
        ParseError::new(message, self.current.line, self.current.column)
    }

    pub(crate) fn error_at_previous(&self, message: &str) -> ParseError {
        ParseError::new(message, self.previous.line, self.previous.column)
    }

    /// Discards tokens until a statement/declaration boundary: a
    /// just-consumed `;`, or a keyword that can start a new declaration
    /// or statement.
    pub(crate) fn synchronize(&mut self) {
        while !self.check(TokenKind::EndOfFile) {
            if self.previous.kind == TokenKind::Semicolon {
                return;
            }
            match self.current.kind {
                TokenKind::Class
                | TokenKind::Function
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return => return,
                kind if kind.is_type_keyword() => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // -- declaration := varDecl | funcDecl | classDecl | statement ------
    //
    // The production itself lives in `stmt.rs` as `declaration_inner`,
    // alongside `statement`/`class_declaration`/`finish_func_declaration`,
    // which it is mutually recursive with.

    fn declaration(&mut self) -> Result<Stmt, ParseError> {
        self.declaration_inner()
    }
}
