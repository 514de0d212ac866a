//! Command Registry
//!
//! Four disjoint namespaces with a defined lookup order for bare names:
//! aliases, then user functions, then the basis (host-registered), then the
//! builtins. A leading escape character reverses the order, so `\help`
//! reaches the builtin even when an alias shadows it. Lookups return
//! snapshots; aliases are stored snapshots, so rebinding the original later
//! never affects an existing alias.
//!
//! Keywords resolve before any registry and cannot be shadowed.

use indexmap::IndexMap;

use crate::interpreter::command::Command;

/// Reverses lookup order and bypasses keywords when it prefixes a name.
pub const ESCAPE_CHAR: char = '\\';

/// Reserved words handled by the evaluator itself.
pub const KEYWORDS: &[&str] =
    &["function", "while", "if", "break", "return", "quit", "help", "time", "shift"];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

#[derive(Default)]
pub struct Registry {
    pub aliases: IndexMap<String, Command>,
    pub functions: IndexMap<String, Command>,
    pub basis: IndexMap<String, Command>,
    pub builtins: IndexMap<String, Command>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `name` to a snapshot. `escaped` reverses the namespace order.
    pub fn lookup(&self, name: &str, escaped: bool) -> Option<Command> {
        let order: [&IndexMap<String, Command>; 4] = if escaped {
            [&self.builtins, &self.basis, &self.functions, &self.aliases]
        } else {
            [&self.aliases, &self.functions, &self.basis, &self.builtins]
        };
        order.iter().find_map(|table| table.get(name).cloned())
    }

    /// True if any namespace defines `name`.
    pub fn resolves(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
            || self.functions.contains_key(name)
            || self.basis.contains_key(name)
            || self.builtins.contains_key(name)
    }

    /// Every name a completion or roster should offer, in lookup order.
    pub fn all_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for table in [&self.aliases, &self.functions, &self.basis, &self.builtins] {
            names.extend(table.keys().map(String::as_str));
        }
        names.extend(KEYWORDS);
        names
    }
}
