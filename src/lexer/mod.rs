//! Lexical analysis
//!
//! Turns source text into a flat token stream terminated by `Eof`. Lexical
//! errors never stop the scan: each one is recorded and the offending text is
//! skipped, so every problem in the input is reported in one pass.

mod tokens;

pub use tokens::{LexerExtras, Token, TokenKind, TokenLiteral};

use logos::Logos;

use crate::common::Span;
use crate::diagnostics::Diagnostic;

/// Output of the lexer
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Lexed {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Lex a source string into tokens
pub fn lex(source: &str) -> Lexed {
    let mut lexer = TokenKind::lexer_with_extras(source, LexerExtras::default());
    let mut out = Lexed::default();

    while let Some(result) = lexer.next() {
        let slice = lexer.slice();
        let range = lexer.span();
        // Strings may span lines; the counter has already moved past them.
        let line = lexer.extras.line - slice.matches('\n').count();
        let span = Span::new(range.start, range.end, line);

        match result {
            Ok(TokenKind::Number) => {
                let token = Token::new(TokenKind::Number, slice, span);
                match slice.parse::<f64>() {
                    Ok(n) => out.tokens.push(token.with_literal(TokenLiteral::Number(n))),
                    Err(_) => out
                        .diagnostics
                        .push(Diagnostic::lexical(span, format!("Invalid number '{slice}'."))),
                }
            }
            Ok(TokenKind::String) => {
                let text = slice[1..slice.len() - 1].to_string();
                out.tokens.push(
                    Token::new(TokenKind::String, slice, span)
                        .with_literal(TokenLiteral::String(text)),
                );
            }
            Ok(TokenKind::UnterminatedString) => {
                out.diagnostics
                    .push(Diagnostic::lexical(span, "Unterminated string."));
            }
            Ok(kind) => out.tokens.push(Token::new(kind, slice, span)),
            Err(()) => {
                for c in slice.chars() {
                    out.diagnostics.push(Diagnostic::lexical(
                        span,
                        format!("Unsupported character '{c}'."),
                    ));
                }
            }
        }
    }

    out.tokens.push(Token::eof(source.len(), lexer.extras.line));
    tracing::debug!(
        tokens = out.tokens.len(),
        errors = out.diagnostics.len(),
        "lexed source"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn trailing_dot_is_not_part_of_number() {
        assert_eq!(
            kinds("1."),
            vec![TokenKind::Number, TokenKind::Dot, TokenKind::Eof]
        );
        let lexed = lex("12.5");
        assert_eq!(
            lexed.tokens[0].literal,
            Some(TokenLiteral::Number(12.5))
        );
    }

    #[test]
    fn keyword_prefix_is_an_identifier() {
        assert_eq!(
            kinds("variables printer"),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn multiline_string_advances_line_counter() {
        let lexed = lex("\"a\nb\" x");
        assert_eq!(lexed.tokens[0].line, 1);
        assert_eq!(lexed.tokens[1].line, 2);
    }

    #[test]
    fn errors_do_not_stop_the_scan() {
        let lexed = lex("@ 1 # 2");
        assert_eq!(lexed.diagnostics.len(), 2);
        assert_eq!(
            lexed.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]
        );
    }
}
