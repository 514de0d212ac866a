//! alias / unalias / undef

use crate::interpreter::command::{Arity, Command};
use crate::repl::Repl;

pub fn make_alias_command() -> Command {
    Command::new(
        "alias",
        "alias newname oldname",
        "Register oldname's current command under newname. The alias keeps a\n\
         snapshot, so redefining oldname later does not change it.",
        Arity::exact(2),
        |repl: &mut Repl, args: &[String]| {
            repl.add_alias(&args[0], &args[1]);
            Ok(0)
        },
    )
}

pub fn make_unalias_command() -> Command {
    Command::new(
        "unalias",
        "unalias name",
        "Remove an alias",
        Arity::exact(1),
        |repl: &mut Repl, args: &[String]| {
            repl.registry.aliases.shift_remove(&args[0]);
            Ok(0)
        },
    )
}

pub fn make_undef_command() -> Command {
    Command::new(
        "undef",
        "undef name",
        "Remove a user-defined function",
        Arity::exact(1),
        |repl: &mut Repl, args: &[String]| {
            repl.unregister(&args[0]);
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
    fn test_alias_snapshots_referent() {
        let mut r = repl();
        r.eval("alias say echo").unwrap();
        assert_eq!(r.eval("say hi").unwrap(), "hi\n");

        // redefining echo later must not affect the alias
        r.eval("function echo").unwrap();
        r.eval("  true").unwrap();
        r.eval("endfunction").unwrap();
        assert_eq!(r.eval("say hi").unwrap(), "hi\n");
        assert_eq!(r.eval("echo hi").unwrap(), "");
    }

    #[test]
    fn test_alias_to_unknown_refused_silently() {
        let mut r = repl();
        r.eval("alias ghost no-such-command").unwrap();
        assert_eq!(r.get("?"), "0");
        let out = r.eval("ghost").unwrap();
        assert!(out.contains("Unknown command: ghost"));
    }

    #[test]
    fn test_alias_cycle_is_harmless() {
        let mut r = repl();
        r.eval("alias a echo").unwrap();
        r.eval("alias b a").unwrap();
        r.eval("alias a b").unwrap();
        // both resolve to the echo snapshot, no lookup loop
        assert_eq!(r.eval("a cycle").unwrap(), "cycle\n");
        assert_eq!(r.eval("b cycle").unwrap(), "cycle\n");
    }

    #[test]
    fn test_unalias() {
        let mut r = repl();
        r.eval("alias say echo").unwrap();
        r.eval("unalias say").unwrap();
        let out = r.eval("say hi").unwrap();
        assert!(out.contains("Unknown command"));
        // removing a missing alias is a no-op
        r.eval("unalias say").unwrap();
        assert_eq!(r.get("?"), "0");
    }

    #[test]
    fn test_undef_removes_function() {
        let mut r = repl();
        r.eval("function f").unwrap();
        r.eval("  echo body").unwrap();
        r.eval("endfunction").unwrap();
        assert_eq!(r.eval("f").unwrap(), "body\n");
        r.eval("undef f").unwrap();
        assert!(r.eval("f").unwrap().contains("Unknown command"));
        // undef of a missing function is a no-op
        r.eval("undef f").unwrap();
        assert_eq!(r.get("?"), "0");
    }
}
