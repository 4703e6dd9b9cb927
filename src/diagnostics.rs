//! Diagnostic reporting with source locations
//!
//! Each phase returns its problems as plain [`Diagnostic`] values. Rendering
//! for a terminal goes through miette, which draws the offending source line
//! with a label under the span.

use crate::common::Span;
use crate::lexer::{Token, TokenKind};
use miette::{NamedSource, SourceSpan};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Source file for error reporting
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: Arc<str>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Arc::from(content.into()),
        }
    }

    pub fn to_named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name.clone(), self.content.to_string())
    }
}

/// Convert our Span to miette's SourceSpan
impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.start.into(), span.len())
    }
}

/// Pipeline stage a diagnostic came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    Lexical,
    Syntax,
    Runtime,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Lexical => write!(f, "Lexical error"),
            Phase::Syntax => write!(f, "Syntax error"),
            Phase::Runtime => write!(f, "Runtime error"),
        }
    }
}

/// A single reported problem
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub phase: Phase,
    pub line: usize,
    pub span: Span,
    /// Where the parser was looking: a quoted lexeme or `end`
    pub near: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn lexical(span: Span, message: impl Into<String>) -> Self {
        Self {
            phase: Phase::Lexical,
            line: span.line,
            span,
            near: None,
            message: message.into(),
        }
    }

    pub fn syntax(token: &Token, message: impl Into<String>) -> Self {
        let near = if token.kind == TokenKind::Eof {
            "end".to_string()
        } else {
            format!("'{}'", token.lexeme)
        };
        Self {
            phase: Phase::Syntax,
            line: token.line,
            span: token.span,
            near: Some(near),
            message: message.into(),
        }
    }

    pub fn runtime(error: &RuntimeError) -> Self {
        Self {
            phase: Phase::Runtime,
            line: error.line,
            span: error.span,
            near: None,
            message: error.message.clone(),
        }
    }

    /// Attach the source text so miette can render it
    pub fn with_source(&self, source: &SourceFile) -> SourceError {
        let src = source.to_named_source();
        let span = SourceSpan::from(self.span);
        let message = self.to_string();
        match self.phase {
            Phase::Lexical => SourceError::Lexical { message, span, src },
            Phase::Syntax => SourceError::Syntax { message, span, src },
            Phase::Runtime => SourceError::Runtime { message, span, src },
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] {}", self.line, self.phase)?;
        if let Some(near) = &self.near {
            write!(f, " at {}", near)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Error raised while evaluating a program. The first one aborts the run.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}\n[line {line}]")]
pub struct RuntimeError {
    pub message: String,
    pub line: usize,
    pub span: Span,
}

impl RuntimeError {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: span.line,
            span,
        }
    }

    pub fn at(token: &Token, message: impl Into<String>) -> Self {
        Self::new(token.span, message)
    }
}

/// Renderable diagnostic carrying the source it points into
#[derive(Error, Debug, miette::Diagnostic, Clone)]
pub enum SourceError {
    #[error("{message}")]
    #[diagnostic(code(luria::lexical))]
    Lexical {
        message: String,
        #[label("not part of the language")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("{message}")]
    #[diagnostic(code(luria::syntax))]
    Syntax {
        message: String,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("{message}")]
    #[diagnostic(code(luria::runtime))]
    Runtime {
        message: String,
        #[label("while evaluating this")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },
}

/// Error reporter that collects diagnostics for one source file
pub struct Reporter {
    source: SourceFile,
    diagnostics: Vec<Diagnostic>,
}

impl Reporter {
    pub fn new(source: SourceFile) -> Self {
        Self {
            source,
            diagnostics: Vec::new(),
        }
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Get the source file
    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    /// Print all diagnostics to stderr
    pub fn emit_all(&self) {
        for diagnostic in &self.diagnostics {
            eprintln!("{:?}", miette::Report::new(diagnostic.with_source(&self.source)));
        }
    }

    /// Get diagnostics by reference
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_diagnostic_names_the_lexeme() {
        let token = Token::new(TokenKind::Semi, ";", Span::new(8, 9, 3));
        let diagnostic = Diagnostic::syntax(&token, "Expected expression.");
        assert_eq!(
            diagnostic.to_string(),
            "[line 3] Syntax error at ';': Expected expression."
        );
    }

    #[test]
    fn eof_is_reported_as_end() {
        let diagnostic = Diagnostic::syntax(&Token::eof(0, 1), "Expected ';' after value.");
        assert_eq!(diagnostic.near.as_deref(), Some("end"));
    }

    #[test]
    fn runtime_error_keeps_line() {
        let error = RuntimeError::new(Span::new(0, 1, 7), "Operands must be numbers.");
        let diagnostic = Diagnostic::runtime(&error);
        assert_eq!(diagnostic.phase, Phase::Runtime);
        assert_eq!(diagnostic.line, 7);
        assert_eq!(
            diagnostic.to_string(),
            "[line 7] Runtime error: Operands must be numbers."
        );
    }

    #[test]
    fn reporter_counts() {
        let mut reporter = Reporter::new(SourceFile::new("t.lur", "@"));
        assert!(!reporter.has_errors());
        reporter.report(Diagnostic::lexical(Span::new(0, 1, 1), "Unsupported character '@'."));
        assert_eq!(reporter.diagnostics().len(), 1);
        let rendered = reporter.diagnostics()[0].with_source(reporter.source());
        assert!(matches!(rendered, SourceError::Lexical { .. }));
    }
}
