//! echo / echo-e

use crate::interpreter::command::{Arity, Command};
use crate::repl::Repl;

pub fn make_echo_command() -> Command {
    Command::new(
        "echo",
        "echo [ args ]",
        "Write arguments to standard output",
        Arity::any(),
        |repl: &mut Repl, args: &[String]| {
            repl.println(&args.join(" "));
            Ok(0)
        },
    )
}

pub fn make_echoe_command() -> Command {
    Command::new(
        "echo-e",
        "echo-e [ args ]",
        "Write arguments to standard output, interpreting \\n and \\t escapes",
        Arity::any(),
        |repl: &mut Repl, args: &[String]| {
            let unescaped: Vec<String> =
                args.iter().map(|a| a.replace("\\n", "\n").replace("\\t", "\t")).collect();
            repl.println(&unescaped.join(" "));
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
    fn test_echo_joins_args() {
        let mut r = repl();
        assert_eq!(r.eval("echo a b  c").unwrap(), "a b c\n");
    }

    #[test]
    fn test_echo_no_args_prints_empty_line() {
        let mut r = repl();
        assert_eq!(r.eval("echo").unwrap(), "\n");
    }

    #[test]
    fn test_echo_e_unescapes() {
        let mut r = repl();
        assert_eq!(r.eval("echo-e 'a\\nb'").unwrap(), "a\nb\n");
        assert_eq!(r.eval("echo-e 'a\\tb'").unwrap(), "a\tb\n");
    }
}
