//! Interpreter Errors and Control Signals
//!
//! Error types used by the evaluator:
//! - syntax errors from the lexer and block builders
//! - runtime errors from command dispatch
//! - control signals (break/return/shift) carried on the error channel
//!
//! Control signals are not failures. They ride the `Err` variant so that `?`
//! unwinds them through nested evaluation, and the enclosing loop or function
//! invocation pattern-matches to absorb them. A signal that reaches the top
//! of `run()` is reported as a one-line diagnostic.

use std::fmt;
use thiserror::Error;

/// Non-local exits raised by the `break`, `return`, and `shift` keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlSignal {
    /// Terminate the innermost loop.
    Break,
    /// Unwind to the innermost user-function invocation with an optional
    /// result value.
    Return(Option<String>),
    /// Rebuild the current function invocation's positional bindings.
    Shift,
}

impl fmt::Display for ControlSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlSignal::Break => write!(f, "break"),
            ControlSignal::Return(_) => write!(f, "return"),
            ControlSignal::Shift => write!(f, "shift"),
        }
    }
}

/// Unified error type for evaluation.
#[derive(Debug, Error)]
pub enum ReplError {
    /// Unmatched quote, unmatched backtick, missing predicate. Sets `?` to 2
    /// at the reporting site.
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// Dispatch and command failures that carry a message.
    #[error("{0}")]
    Runtime(String),

    /// A control signal unwinding to its catch site.
    #[error("{0}")]
    Signal(ControlSignal),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl ReplError {
    pub fn syntax(message: impl Into<String>) -> Self {
        ReplError::Syntax(message.into())
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        ReplError::Runtime(message.into())
    }

    /// True for break/return/shift, false for real errors.
    pub fn is_signal(&self) -> bool {
        matches!(self, ReplError::Signal(_))
    }
}

impl From<ControlSignal> for ReplError {
    fn from(signal: ControlSignal) -> Self {
        ReplError::Signal(signal)
    }
}
