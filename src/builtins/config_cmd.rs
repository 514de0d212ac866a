//! config - manage the persistent configuration scope

use crate::interpreter::command::{Arity, Command};
use crate::repl::Repl;
use crate::syntax::is_valid_name;

const USAGE: &str = "config list | get name | set name value | unset name | save";

pub fn make_config_command() -> Command {
    Command::new(
        "config",
        USAGE,
        "Inspect and edit the configuration variables persisted across sessions",
        Arity::at_least(1),
        |repl: &mut Repl, args: &[String]| {
            let Some(index) = repl.config_scope else {
                repl.println("No configuration environment available");
                return Ok(3);
            };

            match (args[0].as_str(), &args[1..]) {
                ("list", []) => {
                    let mut entries: Vec<(String, String)> =
                        repl.env.scope_bindings(index).into_iter().collect();
                    entries.sort();
                    for (name, value) in entries {
                        repl.println(&format!("{} -> {}", name, value));
                    }
                    Ok(0)
                }
                ("get", [name]) => {
                    match repl.env.scope_bindings(index).get(name) {
                        Some(value) => {
                            let value = value.clone();
                            repl.println(&value);
                            Ok(0)
                        }
                        None => Ok(1),
                    }
                }
                ("set", [name, value]) => {
                    if !is_valid_name(name) {
                        repl.println(&format!("Invalid name: {}", name));
                        return Ok(2);
                    }
                    repl.env.bind_at(index, name, value);
                    Ok(0)
                }
                ("unset", [name]) => {
                    if !is_valid_name(name) {
                        repl.println(&format!("Invalid name: {}", name));
                        return Ok(2);
                    }
                    repl.env.unbind_at(index, name);
                    Ok(0)
                }
                ("save", []) => {
                    repl.write_config();
                    Ok(0)
                }
                _ => {
                    repl.println(&format!("Usage: {}", USAGE));
                    Ok(2)
                }
            }
        },
    )
}
