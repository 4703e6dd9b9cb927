//! Luria command line
//!
//! Main entry point for the `luria` command.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use luria::{Interpreter, Reporter, SourceFile};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "luria")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "The Luria scripting language", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Luria script
    Run {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Start the interactive REPL
    Repl,

    /// Print the token stream of a script
    Tokens {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print the parsed program
    Ast {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[arg(long, value_enum, default_value = "sexpr")]
        format: AstFormat,
    },

    /// Show information about the interpreter
    Info,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AstFormat {
    /// Parenthesized prefix notation
    Sexpr,
    /// serde_json dump of the syntax tree
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("luria=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Run { input } => run(&input),
        Commands::Repl => repl(),
        Commands::Tokens { input } => tokens(&input),
        Commands::Ast { input, format } => ast(&input, format),
        Commands::Info => info(),
    }
}

fn read_source(input: &Path) -> Result<SourceFile, ExitCode> {
    match std::fs::read_to_string(input) {
        Ok(content) => Ok(SourceFile::new(input.display().to_string(), content)),
        Err(e) => {
            eprintln!("Could not read {}: {}", input.display(), e);
            Err(ExitCode::from(luria::EXIT_NO_INPUT))
        }
    }
}

fn run(input: &Path) -> ExitCode {
    tracing::info!("Running {:?}", input);
    let source = match read_source(input) {
        Ok(source) => source,
        Err(code) => return code,
    };

    let mut interpreter = Interpreter::new();
    match luria::run(&source.content, &mut interpreter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let mut reporter = Reporter::new(source);
            reporter.extend(e.diagnostics());
            reporter.emit_all();
            ExitCode::from(e.exit_code())
        }
    }
}

fn tokens(input: &Path) -> ExitCode {
    let source = match read_source(input) {
        Ok(source) => source,
        Err(code) => return code,
    };

    let lexed = luria::tokenize(&source.content);
    for token in &lexed.tokens {
        println!("{:>4}  {:<14} {}", token.line, format!("{:?}", token.kind), token.lexeme);
    }
    if lexed.has_errors() {
        let mut reporter = Reporter::new(source);
        reporter.extend(lexed.diagnostics);
        reporter.emit_all();
        return ExitCode::from(luria::EXIT_STATIC_ERROR);
    }
    ExitCode::SUCCESS
}

fn ast(input: &Path, format: AstFormat) -> ExitCode {
    let source = match read_source(input) {
        Ok(source) => source,
        Err(code) => return code,
    };

    let program = match luria::parse(&source.content) {
        Ok(program) => program,
        Err(diagnostics) => {
            let mut reporter = Reporter::new(source);
            reporter.extend(diagnostics);
            reporter.emit_all();
            return ExitCode::from(luria::EXIT_STATIC_ERROR);
        }
    };

    match format {
        AstFormat::Sexpr => println!("{}", luria::ast::printer::print_program(&program)),
        AstFormat::Json => match serde_json::to_string_pretty(&program) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize AST: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }
    ExitCode::SUCCESS
}

fn repl() -> ExitCode {
    println!("Luria REPL v{}", env!("CARGO_PKG_VERSION"));
    println!("Type :help for help, :quit to exit");
    println!();

    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Could not start line editor: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut interpreter = Interpreter::new();

    loop {
        let line = match editor.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Err(e) = editor.add_history_entry(trimmed) {
            tracing::warn!("history: {}", e);
        }

        match trimmed {
            ":quit" | ":q" => break,
            ":help" | ":h" => {
                println!("Commands:");
                println!("  :help, :h    Show this help");
                println!("  :quit, :q    Exit the REPL");
                println!();
                println!("Anything else is run as Luria source. Globals persist between lines.");
            }
            _ => {
                if let Err(e) = luria::run(trimmed, &mut interpreter) {
                    let mut reporter = Reporter::new(SourceFile::new("<repl>", trimmed));
                    reporter.extend(e.diagnostics());
                    reporter.emit_all();
                }
                interpreter.clear_output();
            }
        }
    }

    println!("Goodbye!");
    ExitCode::SUCCESS
}

fn info() -> ExitCode {
    println!("Luria interpreter");
    println!("Version: {}", luria::VERSION);
    println!();
    println!("Language:");
    println!("  - Dynamic values: null, booleans, numbers, strings, arrays, functions");
    println!("  - Block scoping with shadowing");
    println!("  - Recursive functions with fixed arity");
    println!("  - readnumber / readstring / readboolean from standard input");
    println!();
    println!("Exit codes:");
    println!("  {}  lexical or syntax error", luria::EXIT_STATIC_ERROR);
    println!("  {}  unreadable input file", luria::EXIT_NO_INPUT);
    println!("  {}  runtime error", luria::EXIT_RUNTIME_ERROR);
    ExitCode::SUCCESS
}
