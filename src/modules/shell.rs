//! shell module
//!
//! Pass-through to the underlying system: run a program noninteractively and
//! capture its output.

use std::process;

use crate::interpreter::command::{Arity, Command};
use crate::repl::Repl;
use crate::syntax::quote;

pub fn commands() -> Vec<Command> {
    vec![make_shell_command()]
}

fn make_shell_command() -> Command {
    Command::new(
        "shell",
        "shell command [arguments]",
        "Execute a program noninteractively on the underlying system",
        Arity::at_least(1),
        |repl: &mut Repl, args: &[String]| {
            let line = args.iter().map(|a| quote(a)).collect::<Vec<_>>().join(" ");
            let output = match process::Command::new("sh").arg("-c").arg(&line).output() {
                Ok(output) => output,
                Err(e) => {
                    repl.println(&format!("Error: {}", e));
                    return Ok(2);
                }
            };
            repl.print(&String::from_utf8_lossy(&output.stdout));
            Ok(output.status.code().unwrap_or(1))
        },
    )
}
