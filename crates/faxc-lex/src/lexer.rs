//! The streaming lexer: source text (already decoded to UTF-8) → tokens.

use crate::cursor::Cursor;
use crate::token::{keyword_kind, Token, TokenKind};
use crate::unicode::{is_digit_in_base, is_ident_continue, is_ident_start};

/// Scans Fax source text into tokens.
///
/// The lexer is a straight-line scanner with single-character lookahead;
/// its only stateful scanning modes are "inside a multi-line string" and
/// "nested block comment depth", both handled locally within the relevant
/// `lex_*` method rather than as persistent lexer state.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over already-decoded UTF-8 source text. Use
    /// [`crate::encoding::decode`] first if the source is raw bytes tagged
    /// with an [`crate::encoding::Encoding`].
    pub fn new(source: &'a str) -> Self {
        Lexer {
            cursor: Cursor::new(source),
        }
    }

    /// Returns the next token, or `TokenKind::EndOfFile` indefinitely once
    /// the input is exhausted. An invalid sequence yields an `Invalid`
    /// token whose lexeme is the diagnostic message; the lexer never
    /// panics and never throws.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let line = self.cursor.line();
        let column = self.cursor.column();

        if self.cursor.is_at_end() {
            return Token::new(TokenKind::EndOfFile, "", line, column);
        }

        let c = self.cursor.current_char();
        match c {
            '(' => self.single(TokenKind::LParen, line, column),
            ')' => self.single(TokenKind::RParen, line, column),
            '[' => self.single(TokenKind::LBracket, line, column),
            ']' => self.single(TokenKind::RBracket, line, column),
            '{' => self.single(TokenKind::LBrace, line, column),
            '}' => self.single(TokenKind::RBrace, line, column),
            ',' => self.single(TokenKind::Comma, line, column),
            ';' => self.single(TokenKind::Semicolon, line, column),
            '.' => self.single(TokenKind::Dot, line, column),
            '+' => self.single(TokenKind::Plus, line, column),
            '-' => self.single(TokenKind::Minus, line, column),
            '*' => self.single(TokenKind::Star, line, column),
            '/' => self.single(TokenKind::Slash, line, column),
            '%' => self.single(TokenKind::Percent, line, column),
            '^' => self.single(TokenKind::Caret, line, column),
            '~' => self.single(TokenKind::Tilde, line, column),
            ':' => self.single(TokenKind::Colon, line, column),
            '=' => self.lex_equals(line, column),
            '!' => self.lex_bang(line, column),
            '<' => self.lex_lt(line, column),
            '>' => self.lex_gt(line, column),
            '&' => self.lex_amp(line, column),
            '|' => self.lex_pipe(line, column),
            '?' => self.lex_question(line, column),
            '"' => self.lex_string(line, column),
            '\'' => self.lex_char(line, column),
            c if c.is_ascii_digit() => self.lex_number(line, column),
            c if is_ident_start(c) => self.lex_identifier(line, column),
            c => {
                self.cursor.advance();
                Token::new(
                    TokenKind::Invalid,
                    format!("Unexpected character '{c}'"),
                    line,
                    column,
                )
            }
        }
    }

    /// Returns the next token without advancing lexer state.
    pub fn peek_token(&mut self) -> Token {
        let snapshot = self.cursor.snapshot();
        let tok = self.next_token();
        self.cursor.restore(snapshot);
        tok
    }

    /// Collects every token up to and including the terminal `EndOfFile`.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.is_eof();
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn single(&mut self, kind: TokenKind, line: u32, column: u32) -> Token {
        let lexeme = self.cursor.current_char().to_string();
        self.cursor.advance();
        Token::new(kind, lexeme, line, column)
    }

    fn two(&mut self, kind: TokenKind, lexeme: &str, line: u32, column: u32) -> Token {
        self.cursor.advance();
        self.cursor.advance();
        Token::new(kind, lexeme, line, column)
    }

    fn lex_equals(&mut self, line: u32, column: u32) -> Token {
        self.cursor.advance();
        match self.cursor.current_char() {
            '=' => {
                self.cursor.advance();
                Token::new(TokenKind::EqEq, "==", line, column)
            }
            '?' => {
                self.cursor.advance();
                Token::new(TokenKind::AssignQuestion, "=?", line, column)
            }
            _ => Token::new(TokenKind::Assign, "=", line, column),
        }
    }

    fn lex_bang(&mut self, line: u32, column: u32) -> Token {
        self.cursor.advance();
        if self.cursor.current_char() == '=' {
            self.cursor.advance();
            Token::new(TokenKind::NotEq, "!=", line, column)
        } else {
            Token::new(TokenKind::Bang, "!", line, column)
        }
    }

    fn lex_lt(&mut self, line: u32, column: u32) -> Token {
        self.cursor.advance();
        match self.cursor.current_char() {
            '=' => {
                self.cursor.advance();
                Token::new(TokenKind::LtEq, "<=", line, column)
            }
            '<' => {
                self.cursor.advance();
                Token::new(TokenKind::Shl, "<<", line, column)
            }
            _ => Token::new(TokenKind::Lt, "<", line, column),
        }
    }

    fn lex_gt(&mut self, line: u32, column: u32) -> Token {
        self.cursor.advance();
        match self.cursor.current_char() {
            '=' => {
                self.cursor.advance();
                Token::new(TokenKind::GtEq, ">=", line, column)
            }
            '>' => {
                self.cursor.advance();
                Token::new(TokenKind::Shr, ">>", line, column)
            }
            _ => Token::new(TokenKind::Gt, ">", line, column),
        }
    }

    fn lex_amp(&mut self, line: u32, column: u32) -> Token {
        if self.cursor.char_at(1) == '&' {
            self.two(TokenKind::AndAnd, "&&", line, column)
        } else {
            self.single(TokenKind::Amp, line, column)
        }
    }

    fn lex_pipe(&mut self, line: u32, column: u32) -> Token {
        if self.cursor.char_at(1) == '|' {
            self.two(TokenKind::OrOr, "||", line, column)
        } else {
            self.single(TokenKind::Pipe, line, column)
        }
    }

    fn lex_question(&mut self, line: u32, column: u32) -> Token {
        if self.cursor.char_at(1) == '=' {
            self.two(TokenKind::QuestionAssign, "?=", line, column)
        } else {
            self.single(TokenKind::Question, line, column)
        }
    }

    fn lex_identifier(&mut self, line: u32, column: u32) -> Token {
        let start = self.cursor.position();
        self.cursor.advance();
        while !self.cursor.is_at_end() && is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        let kind = keyword_kind(text).unwrap_or(TokenKind::Identifier);
        Token::new(kind, text, line, column)
    }

    fn lex_number(&mut self, line: u32, column: u32) -> Token {
        let start = self.cursor.position();
        while is_digit_in_base(self.cursor.current_char(), 10) {
            self.cursor.advance();
        }
        if self.cursor.current_char() == '.' && self.cursor.char_at(1).is_ascii_digit() {
            self.cursor.advance(); // '.'
            while is_digit_in_base(self.cursor.current_char(), 10) {
                self.cursor.advance();
            }
        }
        if matches!(self.cursor.current_char(), 'e' | 'E') {
            let exp_start = self.cursor.position();
            self.cursor.advance();
            if matches!(self.cursor.current_char(), '+' | '-') {
                self.cursor.advance();
            }
            let digits_start = self.cursor.position();
            while is_digit_in_base(self.cursor.current_char(), 10) {
                self.cursor.advance();
            }
            if self.cursor.position() == digits_start {
                let _ = exp_start;
                return Token::new(
                    TokenKind::Invalid,
                    "Malformed scientific notation: expected digits after exponent",
                    line,
                    column,
                );
            }
        }
        let text = self.cursor.slice_from(start);
        Token::new(TokenKind::LiteralNumber, text, line, column)
    }

    /// Decodes one escape sequence (the `\` has already been consumed).
    /// Returns `Err(message)` for an unrecognized escape.
    fn lex_escape(&mut self) -> Result<char, String> {
        let c = self.cursor.current_char();
        let decoded = match c {
            '"' => '"',
            '\\' => '\\',
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            other => return Err(format!("Invalid escape sequence '\\{other}'")),
        };
        self.cursor.advance();
        Ok(decoded)
    }

    fn lex_string(&mut self, line: u32, column: u32) -> Token {
        if self.cursor.char_at(1) == '"' && self.cursor.char_at(2) == '"' {
            return self.lex_multiline_string(line, column);
        }

        self.cursor.advance(); // opening quote
        let mut content = String::new();
        loop {
            if self.cursor.is_at_end() {
                return Token::new(TokenKind::Invalid, "Unterminated string literal", line, column);
            }
            match self.cursor.current_char() {
                '"' => {
                    self.cursor.advance();
                    return Token::new(TokenKind::LiteralString, content, line, column);
                }
                '\n' => {
                    return Token::new(
                        TokenKind::Invalid,
                        "Newline in single-line string literal",
                        line,
                        column,
                    );
                }
                '\\' => {
                    self.cursor.advance();
                    match self.lex_escape() {
                        Ok(c) => content.push(c),
                        Err(message) => return Token::new(TokenKind::Invalid, message, line, column),
                    }
                }
                c => {
                    content.push(c);
                    self.cursor.advance();
                }
            }
        }
    }

    fn lex_multiline_string(&mut self, line: u32, column: u32) -> Token {
        self.cursor.advance_n(3); // opening """
        if self.cursor.current_char() == '\n' {
            self.cursor.advance();
        }

        let indent: String = {
            let rest = self.cursor.remaining();
            rest.chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect()
        };

        let mut content = String::new();
        loop {
            if !indent.is_empty() && !self.cursor.remaining().starts_with(indent.as_str()) {
                if self.cursor.remaining().starts_with("\"\"\"") {
                    // Closing marker at column 0 with no indent is allowed
                    // only when the established indent is also empty.
                } else {
                    return Token::new(
                        TokenKind::Invalid,
                        "Invalid indentation in multi-line string literal",
                        line,
                        column,
                    );
                }
            }
            if self.cursor.remaining().starts_with(indent.as_str()) {
                self.cursor.advance_n(indent.chars().count());
            }

            if self.cursor.remaining().starts_with("\"\"\"") {
                self.cursor.advance_n(3);
                return Token::new(TokenKind::LiteralString, content, line, column);
            }

            if self.cursor.is_at_end() {
                return Token::new(
                    TokenKind::Invalid,
                    "Unterminated multi-line string literal",
                    line,
                    column,
                );
            }

            loop {
                if self.cursor.is_at_end() {
                    return Token::new(
                        TokenKind::Invalid,
                        "Unterminated multi-line string literal",
                        line,
                        column,
                    );
                }
                let c = self.cursor.current_char();
                if c == '\n' {
                    content.push('\n');
                    self.cursor.advance();
                    break;
                }
                content.push(c);
                self.cursor.advance();
            }
        }
    }

    fn lex_char(&mut self, line: u32, column: u32) -> Token {
        self.cursor.advance(); // opening quote
        if self.cursor.is_at_end() {
            return Token::new(TokenKind::Invalid, "Unterminated character literal", line, column);
        }
        let value = if self.cursor.current_char() == '\\' {
            self.cursor.advance();
            match self.lex_escape() {
                Ok(c) => c,
                Err(message) => return Token::new(TokenKind::Invalid, message, line, column),
            }
        } else {
            let c = self.cursor.current_char();
            self.cursor.advance();
            c
        };
        if self.cursor.current_char() != '\'' {
            return Token::new(
                TokenKind::Invalid,
                "Character literal may only contain one character",
                line,
                column,
            );
        }
        self.cursor.advance();
        let kind = if value.is_ascii() {
            TokenKind::LiteralChar
        } else {
            TokenKind::LiteralCharacter
        };
        Token::new(kind, value.to_string(), line, column)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.cursor.current_char() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.cursor.advance();
                }
                '/' if self.cursor.char_at(1) == '/' => {
                    while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                        self.cursor.advance();
                    }
                }
                '/' if self.cursor.char_at(1) == '*' => {
                    self.cursor.advance();
                    self.cursor.advance();
                    let mut depth = 1u32;
                    while depth > 0 && !self.cursor.is_at_end() {
                        if self.cursor.current_char() == '/' && self.cursor.char_at(1) == '*' {
                            depth += 1;
                            self.cursor.advance();
                            self.cursor.advance();
                        } else if self.cursor.current_char() == '*' && self.cursor.char_at(1) == '/'
                        {
                            depth -= 1;
                            self.cursor.advance();
                            self.cursor.advance();
                        } else {
                            self.cursor.advance();
                        }
                    }
                }
                _ => return,
            }
        }
    }
}

/// Turns already-decoded source text directly into a token vector;
/// convenience wrapper equivalent to `Lexer::new(source).tokenize()`.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}
