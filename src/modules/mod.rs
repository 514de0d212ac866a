//! Built-in Modules
//!
//! Each module is a flat list of commands registered into the basis when the
//! host (or the `modules` builtin) enables it. Only the registration
//! protocol belongs to the evaluator core; the commands themselves are
//! leaves.

pub mod debug_mod;
pub mod json_mod;
pub mod math;
pub mod shell;
pub mod text;

use crate::interpreter::errors::ReplError;
use crate::repl::Repl;

pub const KNOWN_MODULES: &[&str] = &["math", "text", "shell", "json", "debug"];

impl Repl {
    /// Enable a module by name. Re-enabling is a no-op; unknown names are a
    /// runtime error.
    pub fn enable_module(&mut self, name: &str) -> Result<(), ReplError> {
        if self.modules_loaded.iter().any(|m| m == name) {
            return Ok(());
        }
        let commands = match name {
            "math" => math::commands(),
            "text" => text::commands(),
            "shell" => shell::commands(),
            "json" => json_mod::commands(),
            "debug" => debug_mod::commands(),
            _ => return Err(ReplError::runtime(format!("Unknown module: {}", name))),
        };
        for command in commands {
            self.register(command);
        }
        self.modules_loaded.push(name.to_string());
        Ok(())
    }
}
