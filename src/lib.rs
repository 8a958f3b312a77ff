//! Skillet - a small scripting language with typed variables
//!
//! Source text runs through a lexer, a recursive-descent parser, and a
//! tree-walking interpreter. Every variable binding carries a category
//! tag checked against the values written to it.

pub mod ast;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;

use std::io::{self, Write};

pub use error::{Diagnostic, Reporter, RuntimeError, Severity};
pub use interpreter::Interpreter;
pub use lexer::Lexer;
pub use parser::Parser;
pub use value::Value;

/// Outcome of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    /// A lexical or syntax error was reported; nothing executed.
    StaticError,
    /// Execution aborted on a runtime error.
    RuntimeError,
}

impl RunStatus {
    /// Process exit code for a CLI host
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::StaticError => 65,
            RunStatus::RuntimeError => 70,
        }
    }
}

/// Diagnostics and exit status from one run
#[derive(Debug)]
pub struct RunResult {
    pub diagnostics: Vec<Diagnostic>,
    pub status: RunStatus,
}

/// Run Skillet source, writing program output to stdout.
pub fn run(source: &str) -> RunResult {
    run_with_output(source, &mut io::stdout())
}

/// Run Skillet source with program output directed to `out`.
pub fn run_with_output(source: &str, out: &mut dyn Write) -> RunResult {
    let mut reporter = Reporter::new();

    let tokens = Lexer::new(source, &mut reporter).tokenize();
    let statements = Parser::new(tokens, &mut reporter).parse();

    // Any reported lexical or syntax error suppresses execution.
    if reporter.had_error() {
        return RunResult {
            status: RunStatus::StaticError,
            diagnostics: reporter.into_diagnostics(),
        };
    }

    let mut interpreter = Interpreter::new(out);
    if let Err(error) = interpreter.interpret(&statements) {
        reporter.runtime_error(&error);
        return RunResult {
            status: RunStatus::RuntimeError,
            diagnostics: reporter.into_diagnostics(),
        };
    }

    RunResult {
        status: RunStatus::Success,
        diagnostics: reporter.into_diagnostics(),
    }
}

/// Version of the Skillet language
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
