//! Lexer tests

use luria::lexer::{TokenKind, TokenLiteral, lex};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).tokens.iter().map(|t| t.kind).collect()
}

#[test]
fn test_lex_empty() {
    let lexed = lex("");
    assert!(!lexed.has_errors());
    assert_eq!(lexed.tokens.len(), 1);
    assert_eq!(lexed.tokens[0].kind, TokenKind::Eof);
    assert_eq!(lexed.tokens[0].line, 1);
}

#[test]
fn test_lex_whitespace() {
    let lexed = lex("   \t\n  ");
    assert_eq!(lexed.tokens.len(), 1);
    assert_eq!(lexed.tokens[0].kind, TokenKind::Eof);
    assert_eq!(lexed.tokens[0].line, 2);
}

#[test]
fn test_lex_variable_declaration() {
    let lexed = lex("variable x = 42;");
    assert_eq!(
        kinds("variable x = 42;"),
        vec![
            TokenKind::Variable,
            TokenKind::Identifier,
            TokenKind::Eq,
            TokenKind::Number,
            TokenKind::Semi,
            TokenKind::Eof,
        ]
    );
    assert_eq!(lexed.tokens[1].lexeme, "x");
    assert_eq!(lexed.tokens[3].literal, Some(TokenLiteral::Number(42.0)));
}

#[test]
fn test_lex_keywords() {
    let source = "and else false for function if null or print readboolean readnumber \
                  readstring return true variable while";
    let lexed = lex(source);
    assert!(lexed.tokens[..lexed.tokens.len() - 1]
        .iter()
        .all(|t| t.kind.is_keyword()));
    assert_eq!(lexed.tokens.len(), 17);
}

#[test]
fn test_lex_two_char_operators() {
    assert_eq!(
        kinds("== != <= >= = ! < >"),
        vec![
            TokenKind::EqEq,
            TokenKind::Ne,
            TokenKind::Le,
            TokenKind::Ge,
            TokenKind::Eq,
            TokenKind::Bang,
            TokenKind::Lt,
            TokenKind::Gt,
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        kinds("a<=b"),
        vec![
            TokenKind::Identifier,
            TokenKind::Le,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_arithmetic_and_delimiters() {
    assert_eq!(
        kinds("(a[1] + b) * -c / d % e ^ f, {}."),
        vec![
            TokenKind::LParen,
            TokenKind::Identifier,
            TokenKind::LBracket,
            TokenKind::Number,
            TokenKind::RBracket,
            TokenKind::Plus,
            TokenKind::Identifier,
            TokenKind::RParen,
            TokenKind::Star,
            TokenKind::Minus,
            TokenKind::Identifier,
            TokenKind::Slash,
            TokenKind::Identifier,
            TokenKind::Percent,
            TokenKind::Identifier,
            TokenKind::Caret,
            TokenKind::Identifier,
            TokenKind::Comma,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::Dot,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_comments_are_skipped() {
    let lexed = lex("print 1; // trailing words ; ( \nprint 2;");
    assert_eq!(lexed.tokens.len(), 7);
    assert_eq!(lexed.tokens[3].line, 2);
}

#[test]
fn test_lex_string_literal() {
    let lexed = lex(r#"print "hello, world";"#);
    let token = &lexed.tokens[1];
    assert_eq!(token.kind, TokenKind::String);
    assert_eq!(token.lexeme, "\"hello, world\"");
    assert_eq!(
        token.literal,
        Some(TokenLiteral::String("hello, world".to_string()))
    );
}

#[test]
fn test_lex_unterminated_string() {
    let lexed = lex("print \"oops;\nprint 1;");
    assert_eq!(lexed.diagnostics.len(), 1);
    assert_eq!(lexed.diagnostics[0].message, "Unterminated string.");
    assert_eq!(lexed.diagnostics[0].line, 1);
    assert_eq!(kinds("print \"oops"), vec![TokenKind::Print, TokenKind::Eof]);
}

#[test]
fn test_lex_unsupported_characters() {
    let lexed = lex("a @ b\n$");
    let messages: Vec<_> = lexed
        .diagnostics
        .iter()
        .map(|d| (d.line, d.message.as_str()))
        .collect();
    assert_eq!(
        messages,
        vec![
            (1, "Unsupported character '@'."),
            (2, "Unsupported character '$'."),
        ]
    );
    assert_eq!(
        lexed.diagnostics[0].to_string(),
        "[line 1] Lexical error: Unsupported character '@'."
    );
}

#[test]
fn test_lex_line_numbers() {
    let lexed = lex("a\n\nb\n   c");
    let lines: Vec<_> = lexed.tokens.iter().map(|t| t.line).collect();
    assert_eq!(lines, vec![1, 3, 4, 4]);
}

#[test]
fn test_lex_spans() {
    let lexed = lex("print abc;");
    let span = lexed.tokens[1].span;
    assert_eq!((span.start, span.end), (6, 9));
    assert_eq!(lexed.tokens[3].span.start, 10);
}

const VOCABULARY: &[(&str, TokenKind)] = &[
    ("while", TokenKind::While),
    ("function", TokenKind::Function),
    ("readnumber", TokenKind::ReadNumber),
    ("x", TokenKind::Identifier),
    ("while_", TokenKind::Identifier),
    ("n2", TokenKind::Identifier),
    ("7", TokenKind::Number),
    ("3.25", TokenKind::Number),
    ("\"s p\"", TokenKind::String),
    ("==", TokenKind::EqEq),
    ("=", TokenKind::Eq),
    ("<=", TokenKind::Le),
    ("!", TokenKind::Bang),
    ("^", TokenKind::Caret),
    ("(", TokenKind::LParen),
    ("]", TokenKind::RBracket),
    (";", TokenKind::Semi),
    (".", TokenKind::Dot),
];

proptest! {
    #[test]
    fn space_separated_lexemes_keep_their_kinds(
        picks in prop::collection::vec(prop::sample::select(VOCABULARY), 0..40)
    ) {
        let source = picks.iter().map(|(text, _)| *text).collect::<Vec<_>>().join(" ");
        let lexed = lex(&source);
        prop_assert!(!lexed.has_errors());

        let mut expected: Vec<TokenKind> = picks.iter().map(|(_, kind)| *kind).collect();
        expected.push(TokenKind::Eof);
        prop_assert_eq!(kinds(&source), expected);

        let lexemes: Vec<&str> = lexed.tokens.iter().map(|t| t.lexeme.as_str()).collect();
        let picked: Vec<&str> = picks.iter().map(|(text, _)| *text).collect();
        prop_assert_eq!(&lexemes[..lexemes.len() - 1], &picked[..]);
    }
}
