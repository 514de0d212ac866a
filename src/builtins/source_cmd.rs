//! source / cat

use std::path::Path;

use crate::interpreter::command::{Arity, Command};
use crate::repl::Repl;

pub fn make_source_command() -> Command {
    Command::new(
        "source",
        "source filename",
        "Evaluate a file line by line in the current scope",
        Arity::exact(1),
        |repl: &mut Repl, args: &[String]| repl.source(Path::new(&args[0]), false),
    )
}

pub fn make_cat_command() -> Command {
    Command::new(
        "cat",
        "cat",
        "Copy standard input to standard output",
        Arity::exact(0),
        |repl: &mut Repl, _args: &[String]| {
            while let Some(line) = repl.read_stdin_line() {
                repl.println(&line);
            }
            Ok(0)
        },
    )
}
