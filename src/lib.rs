//! Luria: a small dynamically-typed scripting language
//!
//! Programs are lexed, parsed into an AST with error recovery, then run by a
//! tree-walking interpreter over a chain of scopes.
//!
//! # Architecture
//!
//! ```text
//! Source → Lexer → Parser → AST → Interpreter
//! ```
//!
//! # Example
//!
//! ```luria
//! function fib(n) {
//!     if (n < 2) return n;
//!     return fib(n - 1) + fib(n - 2);
//! }
//!
//! variable xs = [fib(10), "ten"];
//! print xs;
//! ```

pub mod ast;
pub mod common;
pub mod diagnostics;
pub mod interp;
pub mod lexer;
pub mod parser;

pub use diagnostics::{Diagnostic, Reporter, RuntimeError, SourceFile};

pub use ast::Program;
pub use interp::{Interpreter, Value};
pub use lexer::Token;

use thiserror::Error;

/// Language version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit status for lexical or syntax errors
pub const EXIT_STATIC_ERROR: u8 = 65;
/// Exit status for runtime errors
pub const EXIT_RUNTIME_ERROR: u8 = 70;
/// Exit status when the script can't be read
pub const EXIT_NO_INPUT: u8 = 66;

/// Why a run of some source text failed
#[derive(Debug, Error)]
pub enum RunError {
    /// Lexing or parsing reported errors; nothing was executed
    #[error("{} static error(s)", .0.len())]
    Static(Vec<Diagnostic>),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl RunError {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Static(_) => EXIT_STATIC_ERROR,
            RunError::Runtime(_) => EXIT_RUNTIME_ERROR,
        }
    }

    /// Every diagnostic behind this failure, in source order
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            RunError::Static(diagnostics) => diagnostics.clone(),
            RunError::Runtime(error) => vec![Diagnostic::runtime(error)],
        }
    }
}

/// Tokenize source code. Lexical errors are returned alongside the tokens.
pub fn tokenize(source: &str) -> lexer::Lexed {
    lexer::lex(source)
}

/// Parse source code to an AST
///
/// Lexical and syntax errors are collected together; any of them fails the
/// whole parse.
pub fn parse(source: &str) -> Result<Program, Vec<Diagnostic>> {
    let lexed = lexer::lex(source);
    let parsed = parser::parse(&lexed.tokens);

    let mut diagnostics = lexed.diagnostics;
    diagnostics.extend(parsed.diagnostics);
    if diagnostics.is_empty() {
        Ok(parsed.program)
    } else {
        diagnostics.sort_by_key(|d| d.span.start);
        Err(diagnostics)
    }
}

/// Parse and execute source code on `interpreter`
pub fn run(source: &str, interpreter: &mut Interpreter) -> Result<(), RunError> {
    let program = parse(source).map_err(RunError::Static)?;
    tracing::debug!(statements = program.statements.len(), "parsed");
    interpreter.run(&program)?;
    Ok(())
}
