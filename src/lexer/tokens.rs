//! Token definitions for the Luria lexer

use crate::common::Span;
use logos::Logos;
use serde::{Deserialize, Serialize};

/// A token with its kind, source text and optional literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source slice the token was built from
    pub lexeme: String,
    /// Parsed value for number and string tokens
    pub literal: Option<TokenLiteral>,
    pub line: usize,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            literal: None,
            line: span.line,
            span,
        }
    }

    pub fn with_literal(mut self, literal: TokenLiteral) -> Self {
        self.literal = Some(literal);
        self
    }

    pub fn eof(offset: usize, line: usize) -> Self {
        Self::new(TokenKind::Eof, "", Span::point(offset, line))
    }
}

/// Typed value carried by literal tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenLiteral {
    Number(f64),
    String(String),
}

/// State threaded through the generated lexer
#[derive(Debug, Clone, Copy)]
pub struct LexerExtras {
    /// Current line, 1-based
    pub line: usize,
}

impl Default for LexerExtras {
    fn default() -> Self {
        Self { line: 1 }
    }
}

/// Token kinds recognized by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos, Serialize, Deserialize)]
#[logos(extras = LexerExtras)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    // Keywords
    #[token("and")]
    And,
    #[token("else")]
    Else,
    #[token("false")]
    False,
    #[token("for")]
    For,
    #[token("function")]
    Function,
    #[token("if")]
    If,
    #[token("null")]
    Null,
    #[token("or")]
    Or,
    #[token("print")]
    Print,
    #[token("readboolean")]
    ReadBoolean,
    #[token("readnumber")]
    ReadNumber,
    #[token("readstring")]
    ReadString,
    #[token("return")]
    Return,
    #[token("true")]
    True,
    #[token("variable")]
    Variable,
    #[token("while")]
    While,

    // Literals
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,
    #[regex(r#""[^"]*""#, count_newlines)]
    String,
    /// An opening quote that runs to the end of input
    #[regex(r#""[^"]*"#, count_newlines)]
    UnterminatedString,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("!")]
    Bang,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("==")]
    EqEq,
    #[token("!=")]
    Ne,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    // Punctuation
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,

    #[token("\n", |lex| {
        lex.extras.line += 1;
        logos::Skip
    })]
    Newline,

    // Special
    Eof,
}

fn count_newlines(lex: &mut logos::Lexer<TokenKind>) -> bool {
    lex.extras.line += lex.slice().matches('\n').count();
    true
}

impl TokenKind {
    /// Check if this token is a reserved word
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::And
                | TokenKind::Else
                | TokenKind::False
                | TokenKind::For
                | TokenKind::Function
                | TokenKind::If
                | TokenKind::Null
                | TokenKind::Or
                | TokenKind::Print
                | TokenKind::ReadBoolean
                | TokenKind::ReadNumber
                | TokenKind::ReadString
                | TokenKind::Return
                | TokenKind::True
                | TokenKind::Variable
                | TokenKind::While
        )
    }

    /// Tokens that can only appear at the start of a statement or declaration.
    /// The parser resynchronizes in front of these after a syntax error.
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Function
                | TokenKind::Variable
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return
                | TokenKind::ReadBoolean
                | TokenKind::ReadNumber
                | TokenKind::ReadString
        )
    }

    /// Get the string representation of the token
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::And => "and",
            TokenKind::Else => "else",
            TokenKind::False => "false",
            TokenKind::For => "for",
            TokenKind::Function => "function",
            TokenKind::If => "if",
            TokenKind::Null => "null",
            TokenKind::Or => "or",
            TokenKind::Print => "print",
            TokenKind::ReadBoolean => "readboolean",
            TokenKind::ReadNumber => "readnumber",
            TokenKind::ReadString => "readstring",
            TokenKind::Return => "return",
            TokenKind::True => "true",
            TokenKind::Variable => "variable",
            TokenKind::While => "while",
            TokenKind::Number => "<number>",
            TokenKind::String => "<string>",
            TokenKind::UnterminatedString => "<unterminated string>",
            TokenKind::Identifier => "<identifier>",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Caret => "^",
            TokenKind::Bang => "!",
            TokenKind::Eq => "=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::EqEq => "==",
            TokenKind::Ne => "!=",
            TokenKind::Le => "<=",
            TokenKind::Ge => ">=",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Semi => ";",
            TokenKind::Dot => ".",
            TokenKind::Newline => "<newline>",
            TokenKind::Eof => "<eof>",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
