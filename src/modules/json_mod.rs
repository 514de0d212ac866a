//! json module
//!
//! Helpers for composing and picking apart JSON values on the command line.
//! Malformed JSON is exit code 2; a value of the wrong container kind is 3.

use serde_json::Value;

use crate::interpreter::command::{Arity, Command};
use crate::repl::Repl;

pub fn commands() -> Vec<Command> {
    vec![
        make_json_object_command(),
        make_json_list_command(),
        make_json_get_command(),
        make_json_set_command(),
        make_json_is_list_command(),
        make_json_is_object_command(),
        make_json_list_append_command(),
        make_json_list_pop_command(),
        make_json_list_get_command(),
        make_json_list_set_command(),
    ]
}

fn parse(repl: &mut Repl, text: &str) -> Option<Value> {
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(_) => {
            repl.println("Malformed JSON");
            None
        }
    }
}

/// Arguments that should become JSON values parse as JSON when they can and
/// fall back to strings, so `json-set obj key word` works without nested
/// quoting.
fn parse_lenient(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn parse_list(repl: &mut Repl, text: &str) -> Option<Vec<Value>> {
    match parse(repl, text)? {
        Value::Array(items) => Some(items),
        _ => {
            repl.println("Not a list!");
            None
        }
    }
}

fn show(repl: &mut Repl, value: &Value) {
    let line = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    repl.println(&line);
}

fn make_json_object_command() -> Command {
    Command::new(
        "json-object",
        "json-object",
        "Create an empty JSON object",
        Arity::exact(0),
        |repl: &mut Repl, _args: &[String]| {
            repl.println("{}");
            Ok(0)
        },
    )
}

fn make_json_list_command() -> Command {
    Command::new(
        "json-list",
        "json-list",
        "Create an empty JSON list",
        Arity::exact(0),
        |repl: &mut Repl, _args: &[String]| {
            repl.println("[]");
            Ok(0)
        },
    )
}

fn make_json_get_command() -> Command {
    Command::new(
        "json-get",
        "json-get json-string selector [selectors ...]",
        "Select fields from JSON objects; numeric selectors index lists",
        Arity::at_least(2),
        |repl: &mut Repl, args: &[String]| {
            let Some(mut finger) = parse(repl, &args[0]) else { return Ok(2) };
            for selector in &args[1..] {
                let next = match &finger {
                    Value::Object(map) => map.get(selector).cloned(),
                    Value::Array(items) => selector
                        .parse::<usize>()
                        .ok()
                        .and_then(|index| items.get(index))
                        .cloned(),
                    _ => None,
                };
                match next {
                    Some(value) => finger = value,
                    None => {
                        repl.println(&format!("Field {} not found", selector));
                        return Ok(2);
                    }
                }
            }
            let rendered = finger.to_string();
            repl.println(&rendered);
            Ok(0)
        },
    )
}

fn make_json_set_command() -> Command {
    Command::new(
        "json-set",
        "json-set json-string field value",
        "Set a field in a JSON object",
        Arity::exact(3),
        |repl: &mut Repl, args: &[String]| {
            let Some(value) = parse(repl, &args[0]) else { return Ok(2) };
            let Value::Object(mut map) = value else {
                repl.println("Not an object!");
                return Ok(3);
            };
            map.insert(args[1].clone(), parse_lenient(&args[2]));
            repl.println(&Value::Object(map).to_string());
            Ok(0)
        },
    )
}

fn make_json_is_list_command() -> Command {
    Command::new(
        "json-is-list",
        "json-is-list json-string",
        "Succeed when json-string is a list",
        Arity::exact(1),
        |repl: &mut Repl, args: &[String]| {
            let Some(value) = parse(repl, &args[0]) else { return Ok(2) };
            Ok(if value.is_array() { 0 } else { 1 })
        },
    )
}

fn make_json_is_object_command() -> Command {
    Command::new(
        "json-is-object",
        "json-is-object json-string",
        "Succeed when json-string is an object",
        Arity::exact(1),
        |repl: &mut Repl, args: &[String]| {
            let Some(value) = parse(repl, &args[0]) else { return Ok(2) };
            Ok(if value.is_object() { 0 } else { 1 })
        },
    )
}

fn make_json_list_append_command() -> Command {
    Command::new(
        "json-list-append",
        "json-list-append json-string value",
        "Append a value to a JSON list",
        Arity::exact(2),
        |repl: &mut Repl, args: &[String]| {
            let Some(mut items) = parse_list(repl, &args[0]) else { return Ok(classify(&args[0])) };
            items.push(parse_lenient(&args[1]));
            repl.println(&Value::Array(items).to_string());
            Ok(0)
        },
    )
}

fn make_json_list_pop_command() -> Command {
    Command::new(
        "json-list-pop",
        "json-list-pop json-string",
        "Pop the last value off of a JSON list",
        Arity::exact(1),
        |repl: &mut Repl, args: &[String]| {
            let Some(mut items) = parse_list(repl, &args[0]) else { return Ok(classify(&args[0])) };
            if items.pop().is_none() {
                repl.println("Empty list");
                return Ok(1);
            }
            repl.println(&Value::Array(items).to_string());
            Ok(0)
        },
    )
}

fn make_json_list_get_command() -> Command {
    Command::new(
        "json-list-get",
        "json-list-get json-string index",
        "Extract the value at an index from a JSON list",
        Arity::exact(2),
        |repl: &mut Repl, args: &[String]| {
            let Some(items) = parse_list(repl, &args[0]) else { return Ok(classify(&args[0])) };
            let slot = args[1].parse::<usize>().ok().and_then(|index| items.get(index).cloned());
            match slot {
                Some(value) => {
                    show(repl, &value);
                    Ok(0)
                }
                None => {
                    repl.println(&format!("JSON list does not have index {}", args[1]));
                    Ok(2)
                }
            }
        },
    )
}

fn make_json_list_set_command() -> Command {
    Command::new(
        "json-list-set",
        "json-list-set json-string index value",
        "Assign to an index in a JSON list",
        Arity::exact(3),
        |repl: &mut Repl, args: &[String]| {
            let Some(mut items) = parse_list(repl, &args[0]) else { return Ok(classify(&args[0])) };
            let Some(index) = args[1].parse::<usize>().ok().filter(|i| *i < items.len()) else {
                repl.println(&format!("JSON list does not have index {}", args[1]));
                return Ok(2);
            };
            items[index] = parse_lenient(&args[2]);
            repl.println(&Value::Array(items).to_string());
            Ok(0)
        },
    )
}

/// 2 for text that isn't JSON at all, 3 for JSON of the wrong kind.
fn classify(text: &str) -> i32 {
    if serde_json::from_str::<Value>(text).is_ok() {
        3
    } else {
        2
    }
}

#[cfg(test)]
mod tests {
    use crate::repl::{Repl, ReplOptions};

    fn repl() -> Repl {
        Repl::new(ReplOptions {
            modules_enabled: vec!["json".to_string()],
            nodotfile: true,
            noenv: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_constructors() {
        let mut r = repl();
        assert_eq!(r.eval("json-object").unwrap(), "{}\n");
        assert_eq!(r.eval("json-list").unwrap(), "[]\n");
    }

    #[test]
    fn test_set_then_get() {
        let mut r = repl();
        let out = r.eval("json-set {} color green").unwrap();
        assert_eq!(out, "{\"color\":\"green\"}\n");
        let out = r.eval("json-get '{\"color\":\"green\"}' color").unwrap();
        assert_eq!(out, "\"green\"\n");
    }

    #[test]
    fn test_get_walks_nested_paths() {
        let mut r = repl();
        let out = r.eval("json-get '{\"a\":{\"b\":[10,20]}}' a b 1").unwrap();
        assert_eq!(out, "20\n");
    }

    #[test]
    fn test_get_missing_field() {
        let mut r = repl();
        let out = r.eval("json-get '{\"a\":1}' b").unwrap();
        assert!(out.contains("Field b not found"));
        assert_eq!(r.get("?"), "2");
    }

    #[test]
    fn test_malformed_json_is_two() {
        let mut r = repl();
        let out = r.eval("json-get '{broken' a").unwrap();
        assert!(out.contains("Malformed JSON"));
        assert_eq!(r.get("?"), "2");
    }

    #[test]
    fn test_wrong_kind_is_three() {
        let mut r = repl();
        let out = r.eval("json-list-append '{}' 1").unwrap();
        assert!(out.contains("Not a list!"));
        assert_eq!(r.get("?"), "3");
    }

    #[test]
    fn test_list_append_pop() {
        let mut r = repl();
        assert_eq!(r.eval("json-list-append [] 1").unwrap(), "[1]\n");
        assert_eq!(r.eval("json-list-append '[1]' two").unwrap(), "[1,\"two\"]\n");
        assert_eq!(r.eval("json-list-pop '[1,2]'").unwrap(), "[1]\n");
        let out = r.eval("json-list-pop []").unwrap();
        assert!(out.contains("Empty list"));
        assert_eq!(r.get("?"), "1");
    }

    #[test]
    fn test_list_get_set() {
        let mut r = repl();
        assert_eq!(r.eval("json-list-get '[\"a\",\"b\"]' 1").unwrap(), "b\n");
        assert_eq!(r.eval("json-list-set '[1,2]' 0 9").unwrap(), "[9,2]\n");
        r.eval("json-list-get '[1]' 5").unwrap();
        assert_eq!(r.get("?"), "2");
    }

    #[test]
    fn test_is_list_is_object() {
        let mut r = repl();
        r.eval("json-is-list []").unwrap();
        assert_eq!(r.get("?"), "0");
        r.eval("json-is-list '{}'").unwrap();
        assert_eq!(r.get("?"), "1");
        r.eval("json-is-object '{}'").unwrap();
        assert_eq!(r.get("?"), "0");
        r.eval("json-is-object 3").unwrap();
        assert_eq!(r.get("?"), "1");
    }
}
