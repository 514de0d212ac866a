//! debug module
//!
//! Diagnostics over the two parallel stacks: the call stack as a traceback
//! and the scope chain with its bindings.

use crate::interpreter::command::{Arity, Command};
use crate::repl::Repl;

pub fn commands() -> Vec<Command> {
    vec![make_debug_command()]
}

fn make_debug_command() -> Command {
    Command::new(
        "debug",
        "debug",
        "Show the call stack and the scope chain",
        Arity::exact(0),
        |repl: &mut Repl, _args: &[String]| {
            let traceback = repl.call_stack.traceback();
            repl.print(&traceback);
            let scopes = repl.env.list_tree();
            for line in scopes {
                repl.println(&line);
            }
            Ok(0)
        },
    )
}
