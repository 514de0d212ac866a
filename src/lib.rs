//! replish - an embeddable, shell-flavored command interpreter
//!
//! Hosts register native operations as named commands; end users compose
//! them with a small scripting language: variable expansion, quoting,
//! pipelines, command substitution, user-defined functions with positional
//! arguments, conditionals, and loops.

pub mod builtins;
pub mod config;
pub mod input;
pub mod interpreter;
pub mod modules;
pub mod repl;
pub mod syntax;

pub use config::{ConfigStore, FileVarsStore};
pub use input::{LineSource, MemorySource, RustylineSource, StdinSource};
pub use interpreter::command::{Arity, Command};
pub use interpreter::environment::Environment;
pub use interpreter::errors::{ControlSignal, ReplError};
pub use repl::{Repl, ReplOptions};
pub use syntax::Token;
