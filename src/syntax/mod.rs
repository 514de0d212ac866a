//! Command-line syntax: tokens, quoting, and the lexer.

pub mod lexer;
pub mod token;

pub use lexer::lex;
pub use token::{expand_text, is_valid_name, quote, Token};
