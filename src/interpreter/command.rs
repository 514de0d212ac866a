//! Command Model
//!
//! A command is a named, documented callable: `{ name, usage, help, arity,
//! action }`. The action is either a native closure (host or builtin) that
//! receives the interpreter and the argv tail, or a stored user function
//! body. Registry lookups hand out snapshots (cheap `Rc` clones), which is
//! what makes aliases capture their referent at alias time.

use std::rc::Rc;

use crate::interpreter::blocks::function::ReplFunction;
use crate::interpreter::errors::ReplError;
use crate::repl::Repl;

pub type NativeFn = Rc<dyn Fn(&mut Repl, &[String]) -> Result<i32, ReplError>>;

/// What invoking a command runs.
#[derive(Clone)]
pub enum CommandAction {
    Native(NativeFn),
    Function(Rc<ReplFunction>),
}

/// Accepted argument counts, checked at dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub fn exact(n: usize) -> Self {
        Self { min: n, max: Some(n) }
    }

    pub fn at_least(n: usize) -> Self {
        Self { min: n, max: None }
    }

    pub fn range(min: usize, max: usize) -> Self {
        Self { min, max: Some(max) }
    }

    pub fn any() -> Self {
        Self { min: 0, max: None }
    }

    pub fn accepts(&self, n: usize) -> bool {
        n >= self.min && self.max.map_or(true, |max| n <= max)
    }
}

#[derive(Clone)]
pub struct Command {
    name: String,
    usage: String,
    help: String,
    arity: Arity,
    action: CommandAction,
}

impl Command {
    pub fn new<F>(name: &str, usage: &str, help: &str, arity: Arity, action: F) -> Self
    where
        F: Fn(&mut Repl, &[String]) -> Result<i32, ReplError> + 'static,
    {
        Self {
            name: name.to_string(),
            usage: usage.to_string(),
            help: help.to_string(),
            arity,
            action: CommandAction::Native(Rc::new(action)),
        }
    }

    /// Wrap a stored user function. Usage and help come from the function's
    /// reconstructed source.
    pub fn from_function(function: Rc<ReplFunction>) -> Self {
        Self {
            name: function.name.clone(),
            usage: function.usage_string(),
            help: function.help_string(),
            arity: function.arity(),
            action: CommandAction::Function(function),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The one-line usage, prefixed for display.
    pub fn usage(&self) -> String {
        format!("Usage: {}", self.usage)
    }

    /// Usage plus the long help text.
    pub fn help(&self) -> String {
        if self.help.is_empty() {
            self.usage()
        } else {
            format!("{}\n{}", self.usage(), self.help)
        }
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn action(&self) -> &CommandAction {
        &self.action
    }

    /// A stable address for the action, used by call-stack entries to
    /// distinguish same-named commands.
    pub fn action_addr(&self) -> usize {
        match &self.action {
            CommandAction::Native(f) => Rc::as_ptr(f) as *const () as usize,
            CommandAction::Function(f) => Rc::as_ptr(f) as *const () as usize,
        }
    }

    /// Rename a snapshot; aliases keep the referent's behavior and help under
    /// a new name.
    pub fn renamed(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .field("arity", &self.arity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str, arity: Arity) -> Command {
        Command::new(name, &format!("{} ...", name), "does nothing", arity, |_, _| Ok(0))
    }

    #[test]
    fn test_arity_accepts() {
        assert!(Arity::exact(2).accepts(2));
        assert!(!Arity::exact(2).accepts(1));
        assert!(!Arity::exact(2).accepts(3));
        assert!(Arity::at_least(1).accepts(5));
        assert!(!Arity::at_least(1).accepts(0));
        assert!(Arity::range(1, 2).accepts(2));
        assert!(!Arity::range(1, 2).accepts(3));
        assert!(Arity::any().accepts(0));
        assert!(Arity::any().accepts(99));
    }

    #[test]
    fn test_usage_and_help() {
        let cmd = noop("thing", Arity::any());
        assert_eq!(cmd.usage(), "Usage: thing ...");
        assert_eq!(cmd.help(), "Usage: thing ...\ndoes nothing");
    }

    #[test]
    fn test_snapshot_shares_action() {
        let cmd = noop("orig", Arity::any());
        let copy = cmd.clone().renamed("copy");
        assert_eq!(copy.name(), "copy");
        assert_eq!(cmd.action_addr(), copy.action_addr());
    }
}
