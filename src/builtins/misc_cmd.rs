//! Small builtins: exit, true, false, not, slice, sleep, verbose,
//! exceptions, modules

use crate::interpreter::command::{Arity, Command};
use crate::modules::KNOWN_MODULES;
use crate::repl::Repl;

pub fn make_exit_command() -> Command {
    Command::new(
        "exit",
        "exit",
        "End the interactive session",
        Arity::exact(0),
        |repl: &mut Repl, _args: &[String]| {
            repl.done = true;
            Ok(0)
        },
    )
}

pub fn make_true_command() -> Command {
    Command::new("true", "true", "Succeed", Arity::exact(0), |_repl, _args| Ok(0))
}

pub fn make_false_command() -> Command {
    Command::new("false", "false", "Fail", Arity::exact(0), |_repl, _args| Ok(1))
}

pub fn make_not_command() -> Command {
    Command::new(
        "not",
        "not command [args ...]",
        "Run a command and flip its result between 0 and 1",
        Arity::at_least(1),
        |repl: &mut Repl, args: &[String]| {
            let output = repl.execute(&args[0], &args[1..], None)?;
            if !output.is_empty() {
                repl.print(&output);
            }
            Ok(if repl.get("?") == "0" { 1 } else { 0 })
        },
    )
}

pub fn make_slice_command() -> Command {
    Command::new(
        "slice",
        "slice string start [end]",
        "Print a substring by character position; negative positions count\n\
         from the end",
        Arity::range(2, 3),
        |repl: &mut Repl, args: &[String]| {
            let chars: Vec<char> = args[0].chars().collect();
            let Ok(start) = args[1].parse::<isize>() else {
                repl.println("Slice positions must be integers");
                return Ok(2);
            };
            let end = match args.get(2) {
                None => chars.len() as isize,
                Some(raw) => match raw.parse::<isize>() {
                    Ok(end) => end,
                    Err(_) => {
                        repl.println("Slice positions must be integers");
                        return Ok(2);
                    }
                },
            };
            let start = clamp_position(start, chars.len());
            let end = clamp_position(end, chars.len());
            let piece: String = if start < end { chars[start..end].iter().collect() } else { String::new() };
            repl.println(&piece);
            Ok(0)
        },
    )
}

fn clamp_position(position: isize, len: usize) -> usize {
    if position < 0 {
        (len as isize + position).max(0) as usize
    } else {
        (position as usize).min(len)
    }
}

pub fn make_sleep_command() -> Command {
    Command::new(
        "sleep",
        "sleep seconds",
        "Pause for a number of seconds",
        Arity::exact(1),
        |repl: &mut Repl, args: &[String]| {
            match args[0].parse::<f64>() {
                Ok(seconds) if seconds >= 0.0 => {
                    std::thread::sleep(std::time::Duration::from_secs_f64(seconds));
                    Ok(0)
                }
                _ => {
                    repl.println("Can only sleep for a number of seconds");
                    Ok(2)
                }
            }
        },
    )
}

pub fn make_verbose_command() -> Command {
    Command::new(
        "verbose",
        "verbose [on|off]",
        "Show or set command echo tracing",
        Arity::range(0, 1),
        |repl: &mut Repl, args: &[String]| match args.first().map(String::as_str) {
            None => {
                let state = if repl.echo() { "on" } else { "off" };
                repl.println(state);
                Ok(0)
            }
            Some("on") => {
                repl.set_echo(true);
                Ok(0)
            }
            Some("off") => {
                repl.set_echo(false);
                Ok(0)
            }
            Some(_) => {
                repl.println("Usage: verbose [on|off]");
                Ok(2)
            }
        },
    )
}

pub fn make_exceptions_command() -> Command {
    Command::new(
        "exceptions",
        "exceptions [on|off]",
        "Show or set debug mode, where evaluation errors propagate to the host",
        Arity::range(0, 1),
        |repl: &mut Repl, args: &[String]| match args.first().map(String::as_str) {
            None => {
                let state = if repl.debug { "on" } else { "off" };
                repl.println(state);
                Ok(0)
            }
            Some("on") => {
                repl.debug = true;
                Ok(0)
            }
            Some("off") => {
                repl.debug = false;
                Ok(0)
            }
            Some(_) => {
                repl.println("Usage: exceptions [on|off]");
                Ok(2)
            }
        },
    )
}

pub fn make_modules_command() -> Command {
    Command::new(
        "modules",
        "modules [name]",
        "List known and loaded modules, or enable one",
        Arity::range(0, 1),
        |repl: &mut Repl, args: &[String]| match args.first() {
            None => {
                let known = KNOWN_MODULES.join(" ");
                let loaded = repl.loaded_modules().join(" ");
                repl.println(&format!("Known: {}", known));
                repl.println(&format!("Loaded: {}", loaded));
                Ok(0)
            }
            Some(name) => match repl.enable_module(name) {
                Ok(()) => Ok(0),
                Err(e) => {
                    let message = e.to_string();
                    repl.println(&message);
                    Ok(1)
                }
            },
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
    fn test_true_false() {
        let mut r = repl();
        r.eval("true").unwrap();
        assert_eq!(r.get("?"), "0");
        r.eval("false").unwrap();
        assert_eq!(r.get("?"), "1");
    }

    #[test]
    fn test_not_flips_result() {
        let mut r = repl();
        r.eval("not true").unwrap();
        assert_eq!(r.get("?"), "1");
        r.eval("not false").unwrap();
        assert_eq!(r.get("?"), "0");
        r.eval("not no-such-command").unwrap();
        assert_eq!(r.get("?"), "0");
    }

    #[test]
    fn test_not_passes_output_through() {
        let mut r = repl();
        let out = r.eval("not echo visible").unwrap();
        assert_eq!(out, "visible\n");
        assert_eq!(r.get("?"), "1");
    }

    #[test]
    fn test_exit_sets_done() {
        let mut r = repl();
        r.eval("exit").unwrap();
        assert!(r.done());
    }

    #[test]
    fn test_slice() {
        let mut r = repl();
        assert_eq!(r.eval("slice abcdef 1 3").unwrap(), "bc\n");
        assert_eq!(r.eval("slice abcdef 2").unwrap(), "cdef\n");
        assert_eq!(r.eval("slice abcdef -2").unwrap(), "ef\n");
        assert_eq!(r.eval("slice abcdef 4 2").unwrap(), "\n");
        r.eval("slice abcdef x").unwrap();
        assert_eq!(r.get("?"), "2");
    }

    #[test]
    fn test_verbose_toggles_echo() {
        let mut r = repl();
        assert_eq!(r.eval("verbose").unwrap(), "off\n");
        r.eval("verbose on").unwrap();
        assert!(r.echo());
        r.eval("verbose off").unwrap();
        assert!(!r.echo());
    }

    #[test]
    fn test_modules_lists_and_enables() {
        let mut r = repl();
        let out = r.eval("modules").unwrap();
        assert!(out.contains("Known: math text shell json debug"));
        r.eval("modules math").unwrap();
        assert_eq!(r.get("?"), "0");
        assert!(r.loaded_modules().contains(&"math".to_string()));
        r.eval("modules imaginary").unwrap();
        assert_eq!(r.get("?"), "1");
    }
}
