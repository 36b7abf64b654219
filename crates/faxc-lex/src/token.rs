//! Token model: [`TokenKind`] and [`Token`].

use faxc_util::symbol::{
    KW_BREAK, KW_CLASS, KW_CONST, KW_CONTINUE, KW_DO, KW_ELSE, KW_FALSE, KW_FOR, KW_FUNCTION,
    KW_IF, KW_NULL, KW_PRIVATE, KW_PROTECTED, KW_PUBLIC, KW_RETURN, KW_SWITCH, KW_TRUE, KW_UNSET,
    KW_WHILE, TY_BIT, TY_BOOL, TY_BYTE, TY_CHAR, TY_CHARACTER, TY_DECIMAL, TY_DWORD, TY_INTEGER,
    TY_NONE, TY_NUMBER, TY_OBJECT, TY_STRING, TY_TRIBOOL, TY_VOID, TY_WORD,
};
use faxc_util::Symbol;

/// The kind of a token, per the normative token set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // End markers
    EndOfFile,
    Invalid,

    // Literals
    LiteralNumber,
    LiteralString,
    LiteralChar,
    LiteralCharacter,
    LiteralBool,

    Identifier,

    // Type keywords
    Object,
    None,
    Char,
    Character,
    String,
    Number,
    Integer,
    Decimal,
    Bool,
    Tribool,
    Bit,
    Byte,
    Word,
    Dword,
    Void,

    // Control keywords
    If,
    Else,
    Switch,
    For,
    While,
    Do,
    Break,
    Continue,
    Return,

    // Declaration keywords
    Class,
    Function,
    Const,
    Public,
    Private,
    Protected,
    Null,
    True,
    False,
    Unset,

    // Arithmetic operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Comparison operators
    EqEq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,

    // Logical operators
    AndAnd,
    OrOr,
    Bang,

    // Bitwise operators
    Amp,
    Pipe,
    Caret,
    Tilde,
    Shl,
    Shr,

    // Special operators
    Question,
    Colon,
    Assign,
    QuestionAssign,
    AssignQuestion,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Dot,
}

impl TokenKind {
    /// Is this a type keyword (usable to open a `varDecl`/`funcDecl`/`param`)?
    pub fn is_type_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Object
                | TokenKind::None
                | TokenKind::Char
                | TokenKind::Character
                | TokenKind::String
                | TokenKind::Number
                | TokenKind::Integer
                | TokenKind::Decimal
                | TokenKind::Bool
                | TokenKind::Tribool
                | TokenKind::Bit
                | TokenKind::Byte
                | TokenKind::Word
                | TokenKind::Dword
                | TokenKind::Void
        )
    }
}

/// Looks up the keyword `TokenKind` for an identifier lexeme, if any.
///
/// Identifiers are scanned uniformly and classified against this fixed
/// table afterwards.
pub fn keyword_kind(ident: &str) -> Option<TokenKind> {
    Some(match ident {
        "object" => TokenKind::Object,
        "none" => TokenKind::None,
        "char" => TokenKind::Char,
        "character" => TokenKind::Character,
        "string" => TokenKind::String,
        "number" => TokenKind::Number,
        "integer" => TokenKind::Integer,
        "decimal" => TokenKind::Decimal,
        "bool" => TokenKind::Bool,
        "tribool" => TokenKind::Tribool,
        "bit" => TokenKind::Bit,
        "byte" => TokenKind::Byte,
        "word" => TokenKind::Word,
        "dword" => TokenKind::Dword,
        "void" => TokenKind::Void,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "switch" => TokenKind::Switch,
        "for" => TokenKind::For,
        "while" => TokenKind::While,
        "do" => TokenKind::Do,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "return" => TokenKind::Return,
        "class" => TokenKind::Class,
        "function" => TokenKind::Function,
        "const" => TokenKind::Const,
        "public" => TokenKind::Public,
        "private" => TokenKind::Private,
        "protected" => TokenKind::Protected,
        "null" => TokenKind::Null,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "unset" => TokenKind::Unset,
        _ => return Option::None,
    })
}

/// Interns the keyword symbol matching a `TokenKind`, reusing the
/// pre-reserved symbol table entries from `faxc_util::symbol` rather than
/// re-interning the lexeme text.
pub fn keyword_symbol(kind: TokenKind) -> Option<Symbol> {
    Some(match kind {
        TokenKind::Object => TY_OBJECT,
        TokenKind::None => TY_NONE,
        TokenKind::Char => TY_CHAR,
        TokenKind::Character => TY_CHARACTER,
        TokenKind::String => TY_STRING,
        TokenKind::Number => TY_NUMBER,
        TokenKind::Integer => TY_INTEGER,
        TokenKind::Decimal => TY_DECIMAL,
        TokenKind::Bool => TY_BOOL,
        TokenKind::Tribool => TY_TRIBOOL,
        TokenKind::Bit => TY_BIT,
        TokenKind::Byte => TY_BYTE,
        TokenKind::Word => TY_WORD,
        TokenKind::Dword => TY_DWORD,
        TokenKind::Void => TY_VOID,
        TokenKind::If => KW_IF,
        TokenKind::Else => KW_ELSE,
        TokenKind::Switch => KW_SWITCH,
        TokenKind::For => KW_FOR,
        TokenKind::While => KW_WHILE,
        TokenKind::Do => KW_DO,
        TokenKind::Break => KW_BREAK,
        TokenKind::Continue => KW_CONTINUE,
        TokenKind::Return => KW_RETURN,
        TokenKind::Class => KW_CLASS,
        TokenKind::Function => KW_FUNCTION,
        TokenKind::Const => KW_CONST,
        TokenKind::Public => KW_PUBLIC,
        TokenKind::Private => KW_PRIVATE,
        TokenKind::Protected => KW_PROTECTED,
        TokenKind::Null => KW_NULL,
        TokenKind::True => KW_TRUE,
        TokenKind::False => KW_FALSE,
        TokenKind::Unset => KW_UNSET,
        _ => return Option::None,
    })
}

/// A single lexical token: kind, lexeme, and 1-based source position.
///
/// The lexeme is the interned source fragment (decoded to UTF-8
/// internally); for an `Invalid` token, the lexeme is instead the
/// human-readable diagnostic message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: Symbol,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl AsRef<str>, line: u32, column: u32) -> Self {
        Token {
            kind,
            lexeme: Symbol::intern(lexeme.as_ref()),
            line,
            column,
        }
    }

    pub fn lexeme_str(&self) -> &'static str {
        self.lexeme.as_str()
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EndOfFile
    }

    pub fn is_invalid(&self) -> bool {
        self.kind == TokenKind::Invalid
    }
}
