//! Scoped Variable Environment
//!
//! A stack of named scopes, innermost last. Lookups walk innermost to
//! outermost and fall back to a default value. Plain assignment tramples: if
//! any enclosing scope already defines the name, the outermost such binding
//! is updated in place; otherwise the binding lands in the current scope.
//! `bind_here` shadows instead.
//!
//! Scopes are arena-allocated in one `Vec` and referenced by index, pushed at
//! scope entry (function call, pipeline stage) and popped at exit, so there
//! are no parent pointers to dangle.

use std::collections::HashMap;
use std::io::{Read, Write};

/// One scope: a name (for diagnostics) plus its bindings.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub name: String,
    bindings: HashMap<String, String>,
}

impl Scope {
    fn new(name: &str, bindings: HashMap<String, String>) -> Self {
        Self { name: name.to_string(), bindings }
    }
}

/// The scope chain.
#[derive(Debug, Clone)]
pub struct Environment {
    scopes: Vec<Scope>,
    default: String,
}

impl Environment {
    /// A fresh environment with a single base scope.
    pub fn new(name: &str, default_value: &str) -> Self {
        Self {
            scopes: vec![Scope::new(name, HashMap::new())],
            default: default_value.to_string(),
        }
    }

    /// An environment that starts empty; callers push every scope.
    pub fn empty(default_value: &str) -> Self {
        Self { scopes: Vec::new(), default: default_value.to_string() }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Push a scope with initial bindings; returns its index.
    pub fn push_scope(&mut self, name: &str, initial: HashMap<String, String>) -> usize {
        self.scopes.push(Scope::new(name, initial));
        self.scopes.len() - 1
    }

    /// Pop the innermost scope. The base scope cannot be popped.
    pub fn pop_scope(&mut self) -> Option<Scope> {
        if self.scopes.len() <= 1 {
            return None;
        }
        self.scopes.pop()
    }

    /// Trampling assignment: update the outermost scope that already defines
    /// `name`, or create the binding in the current scope.
    pub fn bind(&mut self, name: &str, value: &str) {
        for scope in self.scopes.iter_mut() {
            if scope.bindings.contains_key(name) {
                scope.bindings.insert(name.to_string(), value.to_string());
                return;
            }
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.bindings.insert(name.to_string(), value.to_string());
        }
    }

    /// Shadowing assignment: always bind in the current scope.
    pub fn bind_here(&mut self, name: &str, value: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.bindings.insert(name.to_string(), value.to_string());
        }
    }

    /// Bind directly in the scope at `index`.
    pub fn bind_at(&mut self, index: usize, name: &str, value: &str) {
        if let Some(scope) = self.scopes.get_mut(index) {
            scope.bindings.insert(name.to_string(), value.to_string());
        }
    }

    /// Innermost-first lookup; the default value when nothing defines `name`.
    pub fn get(&self, name: &str) -> String {
        self.lookup(name).map(str::to_string).unwrap_or_else(|| self.default.clone())
    }

    /// Innermost-first lookup without the default fallback.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.bindings.get(name))
            .map(String::as_str)
    }

    /// Remove a binding from the current scope; missing names are fine.
    pub fn unbind(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.bindings.remove(name);
        }
    }

    /// Remove a binding from the scope at `index`.
    pub fn unbind_at(&mut self, index: usize, name: &str) {
        if let Some(scope) = self.scopes.get_mut(index) {
            scope.bindings.remove(name);
        }
    }

    /// `name -> value` lines for the current scope.
    pub fn list(&self) -> Vec<String> {
        self.scopes.last().map(list_scope).unwrap_or_default()
    }

    /// Every scope, innermost first, with banner lines between scopes.
    pub fn list_tree(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for scope in self.scopes.iter().rev() {
            lines.push(format!("==========\n{}\n==========", scope.name));
            lines.extend(list_scope(scope));
        }
        lines
    }

    pub fn scope_names(&self) -> Vec<&str> {
        self.scopes.iter().map(|s| s.name.as_str()).collect()
    }

    /// The bindings of the scope at `index` (for persistence and listings).
    pub fn scope_bindings(&self, index: usize) -> HashMap<String, String> {
        self.scopes.get(index).map(|s| s.bindings.clone()).unwrap_or_default()
    }

    /// Load a JSON `{string: string}` object into the scope at `index`.
    /// An empty reader is not an error.
    pub fn load_from(&mut self, index: usize, reader: &mut dyn Read) -> std::io::Result<()> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        if text.trim().is_empty() {
            return Ok(());
        }
        let vars: HashMap<String, String> = serde_json::from_str(&text)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        if let Some(scope) = self.scopes.get_mut(index) {
            scope.bindings.extend(vars);
        }
        Ok(())
    }

    /// Write the scope at `index` as a JSON object.
    pub fn write_to(&self, index: usize, writer: &mut dyn Write) -> std::io::Result<()> {
        let bindings = self.scope_bindings(index);
        serde_json::to_writer_pretty(&mut *writer, &bindings)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.write_all(b"\n")
    }
}

fn list_scope(scope: &Scope) -> Vec<String> {
    let mut entries: Vec<_> = scope.bindings.iter().collect();
    entries.sort();
    entries.into_iter().map(|(k, v)| format!("{} -> {}", k, v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_level() -> Environment {
        let mut env = Environment::new("parent", "");
        env.push_scope("child", HashMap::new());
        env
    }

    #[test]
    fn test_default_for_missing() {
        let env = Environment::new("e", "fallback");
        assert_eq!(env.get("nope"), "fallback");
        assert_eq!(env.lookup("nope"), None);
    }

    #[test]
    fn test_bind_and_get() {
        let mut env = Environment::new("e", "");
        env.bind("x", "5");
        assert_eq!(env.get("x"), "5");
    }

    #[test]
    fn test_trampling_updates_parent() {
        let mut env = two_level();
        // parent.bind then child.bind must land on the same slot
        env.bind_at(0, "n", "v1");
        env.bind("n", "v2");
        env.pop_scope();
        assert_eq!(env.get("n"), "v2");
    }

    #[test]
    fn test_trample_picks_outermost_definition() {
        let mut env = Environment::new("outer", "");
        env.bind("n", "old");
        env.push_scope("mid", HashMap::new());
        env.bind_here("n", "shadow");
        env.push_scope("inner", HashMap::new());
        env.bind("n", "new");
        // The outermost binding was updated; the shadow is untouched and
        // still wins lookups from inside.
        assert_eq!(env.get("n"), "shadow");
        env.pop_scope();
        env.pop_scope();
        assert_eq!(env.get("n"), "new");
    }

    #[test]
    fn test_bind_without_ancestor_lands_here() {
        let mut env = two_level();
        env.bind("local", "x");
        assert_eq!(env.get("local"), "x");
        env.pop_scope();
        assert_eq!(env.get("local"), "");
    }

    #[test]
    fn test_bind_here_shadows() {
        let mut env = Environment::new("parent", "");
        env.bind_here("n", "v1");
        env.push_scope("child", HashMap::new());
        env.bind_here("n", "v2");
        assert_eq!(env.get("n"), "v2");
        env.pop_scope();
        assert_eq!(env.get("n"), "v1");
    }

    #[test]
    fn test_unbind_current_scope_only() {
        let mut env = Environment::new("parent", "");
        env.bind("n", "v");
        env.push_scope("child", HashMap::new());
        env.unbind("n");
        assert_eq!(env.get("n"), "v");
        env.pop_scope();
        env.unbind("n");
        assert_eq!(env.get("n"), "");
        // unbinding something we don't have is fine
        env.unbind("never");
    }

    #[test]
    fn test_base_scope_cannot_pop() {
        let mut env = Environment::new("base", "");
        assert!(env.pop_scope().is_none());
        env.push_scope("s", HashMap::new());
        assert!(env.pop_scope().is_some());
        assert!(env.pop_scope().is_none());
    }

    #[test]
    fn test_initial_bindings() {
        let mut env = Environment::new("base", "");
        let mut init = HashMap::new();
        init.insert("1".to_string(), "a".to_string());
        env.push_scope("fn", init);
        assert_eq!(env.get("1"), "a");
    }

    #[test]
    fn test_list_and_tree() {
        let mut env = Environment::new("base", "");
        env.bind("a", "1");
        env.push_scope("inner", HashMap::new());
        env.bind_here("b", "2");
        assert_eq!(env.list(), vec!["b -> 2"]);
        let tree = env.list_tree().join("\n");
        assert!(tree.contains("inner"));
        assert!(tree.contains("base"));
        assert!(tree.contains("a -> 1"));
        assert!(tree.contains("b -> 2"));
    }

    #[test]
    fn test_json_round_trip() {
        let mut env = Environment::new("config", "");
        env.bind("greeting", "hello");
        env.bind("count", "3");
        let mut out = Vec::new();
        env.write_to(0, &mut out).unwrap();

        let mut loaded = Environment::new("config", "");
        loaded.load_from(0, &mut out.as_slice()).unwrap();
        assert_eq!(loaded.get("greeting"), "hello");
        assert_eq!(loaded.get("count"), "3");
    }

    #[test]
    fn test_empty_file_is_not_an_error() {
        let mut env = Environment::new("config", "");
        env.load_from(0, &mut "".as_bytes()).unwrap();
        env.load_from(0, &mut "  \n".as_bytes()).unwrap();
    }

    #[test]
    fn test_malformed_json_is_reported() {
        let mut env = Environment::new("config", "");
        assert!(env.load_from(0, &mut "{not json".as_bytes()).is_err());
    }
}
