//! text module
//!
//! String helpers: regex capture/replace/match, length, devnull, strcmp.

use regex_lite::Regex;

use crate::interpreter::command::{Arity, Command};
use crate::repl::Repl;

pub fn commands() -> Vec<Command> {
    vec![
        make_regex_capture_command(),
        make_regex_replace_command(),
        make_regex_match_command(),
        make_length_command(),
        make_devnull_command(),
        make_strcmp_command(),
    ]
}

fn compile(repl: &mut Repl, pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            repl.println(&format!("Invalid pattern: {}", e));
            None
        }
    }
}

fn make_regex_capture_command() -> Command {
    Command::new(
        "regex-capture",
        "regex-capture pattern [strings ...]",
        "Use regex capture groups to extract substrings",
        Arity::at_least(1),
        |repl: &mut Repl, args: &[String]| {
            let Some(regex) = compile(repl, &args[0]) else { return Ok(2) };
            let mut captured = Vec::new();
            for string in &args[1..] {
                let Some(groups) = regex.captures(string) else { continue };
                let pieces: Vec<&str> =
                    groups.iter().skip(1).flatten().map(|m| m.as_str()).collect();
                if !pieces.is_empty() {
                    captured.push(pieces.join(" "));
                }
            }
            let found = !captured.is_empty();
            for line in captured {
                repl.println(&line);
            }
            Ok(if found { 0 } else { 1 })
        },
    )
}

fn make_regex_replace_command() -> Command {
    Command::new(
        "regex-replace",
        "regex-replace pattern replacement [strings ...]",
        "Replace every match of a pattern in each string",
        Arity::at_least(2),
        |repl: &mut Repl, args: &[String]| {
            let Some(regex) = compile(repl, &args[0]) else { return Ok(2) };
            for target in &args[2..] {
                let replaced = regex.replace_all(target, args[1].as_str()).into_owned();
                repl.println(&replaced);
            }
            Ok(0)
        },
    )
}

fn make_regex_match_command() -> Command {
    Command::new(
        "regex-match",
        "regex-match pattern [strings ...]",
        "Print the strings whose start matches the pattern",
        Arity::at_least(1),
        |repl: &mut Repl, args: &[String]| {
            let Some(regex) = compile(repl, &args[0]) else { return Ok(2) };
            let matches: Vec<&String> = args[1..]
                .iter()
                .filter(|target| regex.find(target).map(|m| m.start() == 0).unwrap_or(false))
                .collect();
            let found = !matches.is_empty();
            for target in matches {
                let line = target.clone();
                repl.println(&line);
            }
            Ok(if found { 0 } else { 1 })
        },
    )
}

fn make_length_command() -> Command {
    Command::new(
        "length",
        "length string",
        "Print the length of a string in characters",
        Arity::exact(1),
        |repl: &mut Repl, args: &[String]| {
            repl.println(&args[0].chars().count().to_string());
            Ok(0)
        },
    )
}

fn make_devnull_command() -> Command {
    Command::new(
        "devnull",
        "devnull",
        "Accept input and do nothing with it",
        Arity::exact(0),
        |repl: &mut Repl, _args: &[String]| {
            while repl.read_stdin_line().is_some() {}
            Ok(0)
        },
    )
}

fn make_strcmp_command() -> Command {
    Command::new(
        "strcmp",
        "strcmp lhs rhs",
        "Compare lhs and rhs for string equality",
        Arity::exact(2),
        |_repl: &mut Repl, args: &[String]| Ok(if args[0] == args[1] { 0 } else { 1 }),
    )
}

#[cfg(test)]
mod tests {
    use crate::repl::{Repl, ReplOptions};

    fn repl() -> Repl {
        Repl::new(ReplOptions {
            modules_enabled: vec!["text".to_string()],
            nodotfile: true,
            noenv: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_regex_capture() {
        let mut r = repl();
        let out = r.eval("regex-capture '([0-9]+)' abc123 nope x7").unwrap();
        assert_eq!(out, "123\n7\n");
        assert_eq!(r.get("?"), "0");
    }

    #[test]
    fn test_regex_capture_no_match_fails() {
        let mut r = repl();
        assert_eq!(r.eval("regex-capture '([0-9]+)' letters").unwrap(), "");
        assert_eq!(r.get("?"), "1");
    }

    #[test]
    fn test_regex_replace() {
        let mut r = repl();
        let out = r.eval("regex-replace o 0 foo boo").unwrap();
        assert_eq!(out, "f00\nb00\n");
    }

    #[test]
    fn test_regex_match_anchors_at_start() {
        let mut r = repl();
        let out = r.eval("regex-match ab abc xabc abd").unwrap();
        assert_eq!(out, "abc\nabd\n");
        r.eval("regex-match zz abc").unwrap();
        assert_eq!(r.get("?"), "1");
    }

    #[test]
    fn test_invalid_pattern() {
        let mut r = repl();
        let out = r.eval("regex-match '(' abc").unwrap();
        assert!(out.contains("Invalid pattern"));
        assert_eq!(r.get("?"), "2");
    }

    #[test]
    fn test_length() {
        let mut r = repl();
        assert_eq!(r.eval("length hello").unwrap(), "5\n");
        assert_eq!(r.eval("length ''").unwrap(), "0\n");
    }

    #[test]
    fn test_devnull_swallows_pipeline() {
        let mut r = repl();
        assert_eq!(r.eval("echo noisy | devnull").unwrap(), "");
        assert_eq!(r.get("?"), "0");
    }

    #[test]
    fn test_strcmp() {
        let mut r = repl();
        r.eval("strcmp same same").unwrap();
        assert_eq!(r.get("?"), "0");
        r.eval("strcmp one two").unwrap();
        assert_eq!(r.get("?"), "1");
    }
}
