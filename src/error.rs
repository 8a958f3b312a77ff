//! Error types and diagnostics for the Skillet language
//!
//! Lexical and syntax errors are recovered at the point of detection and
//! collected in a shared [`Reporter`] so one pass can surface several;
//! runtime errors abort interpretation and are reported once.

use crate::token::{Token, TokenKind};
use std::fmt;

/// Runtime error kinds
#[derive(Debug, Clone)]
pub enum RuntimeErrorKind {
    UndefinedVariable(String),
    TypeMismatch(String),
    ArityMismatch { expected: usize, got: usize },
    NotCallable,
    IndexOutOfBounds { index: i64 },
    NonNumericOperand(String),
    DivisionByZero,
}

impl fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeErrorKind::UndefinedVariable(name) => {
                write!(f, "Undefined variable '{}'.", name)
            }
            RuntimeErrorKind::TypeMismatch(message) => write!(f, "{}", message),
            RuntimeErrorKind::ArityMismatch { expected, got } => {
                write!(f, "Expected {} arguments but got {}.", expected, got)
            }
            RuntimeErrorKind::NotCallable => write!(f, "Can only call functions."),
            RuntimeErrorKind::IndexOutOfBounds { index } => {
                write!(f, "Index {} outside array bounds.", index)
            }
            RuntimeErrorKind::NonNumericOperand(message) => write!(f, "{}", message),
            RuntimeErrorKind::DivisionByZero => write!(f, "Division by zero."),
        }
    }
}

/// A runtime error with the source line it was raised from
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub line: usize,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, line: usize) -> Self {
        Self { kind, line }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n[line {}]", self.kind, self.line)
    }
}

impl std::error::Error for RuntimeError {}

/// Result type for evaluation
pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;

/// What stage a diagnostic came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Lexical,
    Syntax,
    Runtime,
}

/// A single collected diagnostic
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub line: usize,
    pub location: String,
    pub message: String,
    pub severity: Severity,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Lexical | Severity::Syntax => {
                write!(f, "[line {}] Error{}: {}", self.line, self.location, self.message)
            }
            Severity::Runtime => write!(f, "{}\n[line {}]", self.message, self.line),
        }
    }
}

/// Shared sink for lexical, syntax, and runtime diagnostics
#[derive(Debug, Default)]
pub struct Reporter {
    diagnostics: Vec<Diagnostic>,
    had_error: bool,
    had_runtime_error: bool,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report an unrecognized character sequence.
    pub fn lexical_error(&mut self, line: usize, message: String) {
        self.had_error = true;
        self.diagnostics.push(Diagnostic {
            line,
            location: String::new(),
            message,
            severity: Severity::Lexical,
        });
    }

    /// Report an unmet expectation at a token.
    pub fn syntax_error(&mut self, token: &Token, message: &str) {
        let location = if token.kind == TokenKind::Eof {
            " at end".to_string()
        } else {
            format!(" at '{}'", token.lexeme)
        };

        self.had_error = true;
        self.diagnostics.push(Diagnostic {
            line: token.line,
            location,
            message: message.to_string(),
            severity: Severity::Syntax,
        });
    }

    /// Report the runtime error that aborted interpretation.
    pub fn runtime_error(&mut self, error: &RuntimeError) {
        self.had_runtime_error = true;
        self.diagnostics.push(Diagnostic {
            line: error.line,
            location: String::new(),
            message: error.kind.to_string(),
            severity: Severity::Runtime,
        });
    }

    /// True if any lexical or syntax error was reported.
    /// Execution must not proceed once this is set.
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
