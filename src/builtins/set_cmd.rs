//! Variable builtins: set, set-local, unset, env, list

use crate::interpreter::command::{Arity, Command};
use crate::interpreter::registry::KEYWORDS;
use crate::repl::Repl;
use crate::syntax::is_valid_name;

pub fn make_set_command() -> Command {
    Command::new(
        "set",
        "set name value",
        "Bind a value to a name, updating an enclosing binding if one exists",
        Arity::exact(2),
        |repl: &mut Repl, args: &[String]| {
            if !is_valid_name(&args[0]) {
                repl.println(&format!("Invalid name: {}", args[0]));
                return Ok(2);
            }
            repl.set(&args[0], &args[1]);
            Ok(0)
        },
    )
}

pub fn make_setlocal_command() -> Command {
    Command::new(
        "set-local",
        "set-local name value",
        "Bind a value to a name in the current scope, shadowing outer bindings",
        Arity::exact(2),
        |repl: &mut Repl, args: &[String]| {
            if !is_valid_name(&args[0]) {
                repl.println(&format!("Invalid name: {}", args[0]));
                return Ok(2);
            }
            repl.set_local(&args[0], &args[1]);
            Ok(0)
        },
    )
}

pub fn make_unset_command() -> Command {
    Command::new(
        "unset",
        "unset name",
        "Remove a binding from the current scope",
        Arity::exact(1),
        |repl: &mut Repl, args: &[String]| {
            if !is_valid_name(&args[0]) {
                repl.println(&format!("Invalid name: {}", args[0]));
                return Ok(2);
            }
            repl.unset(&args[0]);
            Ok(0)
        },
    )
}

pub fn make_env_command() -> Command {
    Command::new(
        "env",
        "env",
        "Show every binding in every scope, innermost first",
        Arity::exact(0),
        |repl: &mut Repl, _args: &[String]| {
            let lines = repl.env.list_tree();
            for line in lines {
                repl.println(&line);
            }
            Ok(0)
        },
    )
}

pub fn make_list_command() -> Command {
    Command::new(
        "list",
        "list",
        "List every registered command by namespace",
        Arity::exact(0),
        |repl: &mut Repl, _args: &[String]| {
            let sections: Vec<(&str, Vec<String>)> = vec![
                ("Aliases", repl.registry.aliases.keys().cloned().collect()),
                ("Functions", repl.registry.functions.keys().cloned().collect()),
                ("Basis", repl.registry.basis.keys().cloned().collect()),
                ("Builtins", repl.registry.builtins.keys().cloned().collect()),
                ("Keywords", KEYWORDS.iter().map(|k| k.to_string()).collect()),
            ];
            for (title, names) in sections {
                if names.is_empty() {
                    continue;
                }
                repl.println(&format!("{}:", title));
                for name in names {
                    repl.println(&format!("  {}", name));
                }
            }
            Ok(0)
        },
    )
}

#[cfg(test)]
mod tests {
    use crate::repl::{Repl, ReplOptions};

    fn repl() -> Repl {
        Repl::new(ReplOptions { nodotfile: true, noenv: true, ..Default::default() })
    }

    #[test]
    fn test_set_and_expand() {
        let mut r = repl();
        r.eval("set x 5").unwrap();
        assert_eq!(r.get("x"), "5");
        assert_eq!(r.get("?"), "0");
    }

    #[test]
    fn test_set_invalid_name() {
        let mut r = repl();
        let out = r.eval("set 'bad name' 1").unwrap();
        assert!(out.contains("Invalid name"));
        assert_eq!(r.get("?"), "2");
    }

    #[test]
    fn test_unset_removes() {
        let mut r = repl();
        r.eval("set x 5").unwrap();
        r.eval("unset x").unwrap();
        assert_eq!(r.get("x"), "");
    }

    #[test]
    fn test_set_local_shadows_inside_function() {
        let mut r = repl();
        r.eval("set x outer").unwrap();
        r.eval("function shadow").unwrap();
        r.eval("  set-local x inner").unwrap();
        r.eval("  echo $x").unwrap();
        r.eval("endfunction").unwrap();
        assert_eq!(r.eval("shadow").unwrap(), "inner\n");
        assert_eq!(r.get("x"), "outer");
    }

    #[test]
    fn test_set_tramples_upward_from_function() {
        let mut r = repl();
        r.eval("set x outer").unwrap();
        r.eval("function clobber").unwrap();
        r.eval("  set x inner").unwrap();
        r.eval("endfunction").unwrap();
        r.eval("clobber").unwrap();
        assert_eq!(r.get("x"), "inner");
    }

    #[test]
    fn test_env_lists_scopes() {
        let mut r = repl();
        r.eval("set greeting hi").unwrap();
        let out = r.eval("env").unwrap();
        assert!(out.contains("greeting -> hi"));
        assert!(out.contains("repl"));
    }

    #[test]
    fn test_list_names_namespaces() {
        let mut r = repl();
        let out = r.eval("list").unwrap();
        assert!(out.contains("Builtins:"));
        assert!(out.contains("  echo"));
        assert!(out.contains("Keywords:"));
        assert!(out.contains("  while"));
    }
}
