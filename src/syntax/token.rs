//! Token Model
//!
//! Tokens carry their quoting class out of the lexer:
//! - `Literal` (single-quoted): expansion is the identity
//! - `Expandable` (double-quoted or bare): `$name` / `${name}` references
//!   are substituted from the environment
//! - `Raw`: the two metacharacters `|` and `` ` `` that survive lexing
//!
//! Expansion returns a sequence of fragments so field splitting can be added
//! later without touching call sites; today every token expands to exactly
//! one fragment.

use lazy_static::lazy_static;
use regex_lite::Regex;

use crate::interpreter::environment::Environment;

lazy_static! {
    /// Identifier grammar for user-visible names (`set`, `unset`, `config`).
    /// The first character additionally admits `?`, `@`, `#`, `-` and digits
    /// so the special bindings (`?`, `@`, `#`, positional `1`..) fit the
    /// same grammar the expander uses.
    static ref NAME_RE: Regex = Regex::new("^[A-Za-z0-9_?@#-][A-Za-z0-9_-]*$").unwrap();
}

/// True if `name` is a valid variable name for `set`/`unset`/`config`.
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

fn is_ident_first(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '?' | '@' | '#' | '-')
}

fn is_ident_rest(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-')
}

/// A lexed word or metacharacter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Transient raw text; after lexing only `|` and `` ` `` remain.
    Raw(String),
    /// Subject to variable substitution at dispatch time.
    Expandable(String),
    /// Used verbatim.
    Literal(String),
}

impl Token {
    /// The token's text regardless of quoting class.
    pub fn text(&self) -> &str {
        match self {
            Token::Raw(s) | Token::Expandable(s) | Token::Literal(s) => s,
        }
    }

    /// Expand this token against `env`, yielding a fragment sequence.
    pub fn expand(&self, env: &Environment) -> Vec<String> {
        match self {
            Token::Raw(s) | Token::Literal(s) => vec![s.clone()],
            Token::Expandable(s) => vec![expand_text(s, env)],
        }
    }

    /// Re-quote the token so it survives re-lexing with the same class.
    pub fn quoted(&self) -> String {
        match self {
            Token::Raw(s) => s.clone(),
            Token::Expandable(s) => format!("\"{}\"", s),
            Token::Literal(s) => format!("'{}'", s),
        }
    }
}

/// Substitute `$name` and `${name}` references in `s`.
///
/// A `$` not followed by an identifier stays a literal `$`; so does a
/// trailing `$`, each `$` of `$$`, and an unterminated or empty `${`.
pub fn expand_text(s: &str, env: &Environment) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '$' {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        // A '$' with nothing usable after it is literal.
        if i + 1 >= chars.len() {
            out.push('$');
            i += 1;
            continue;
        }

        if chars[i + 1] == '{' {
            let start = i + 2;
            let mut j = start;
            while j < chars.len() && chars[j] != '}' {
                j += 1;
            }
            let name: String = chars[start..j.min(chars.len())].iter().collect();
            if j < chars.len() && !name.is_empty() && is_braced_name(&name) {
                out.push_str(&env.get(&name));
                i = j + 1;
            } else {
                out.push('$');
                i += 1;
            }
        } else if is_ident_first(chars[i + 1]) {
            let start = i + 1;
            let mut j = start + 1;
            while j < chars.len() && is_ident_rest(chars[j]) {
                j += 1;
            }
            let name: String = chars[start..j].iter().collect();
            out.push_str(&env.get(&name));
            i = j;
        } else {
            out.push('$');
            i += 1;
        }
    }

    out
}

fn is_braced_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_ident_first(c) => chars.all(is_ident_rest),
        _ => false,
    }
}

/// Quote a plain string for display or re-lexing: wrapped in double quotes
/// when it contains a character the lexer would treat specially.
pub fn quote(s: &str) -> String {
    if s.contains(' ') || s.contains('\t') || s.contains('#') || s.contains('|') || s.contains('`')
    {
        format!("\"{}\"", s)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(pairs: &[(&str, &str)]) -> Environment {
        let mut env = Environment::new("test", "");
        for (k, v) in pairs {
            env.bind(k, v);
        }
        env
    }

    #[test]
    fn test_literal_is_identity() {
        let env = env_with(&[("x", "5")]);
        let t = Token::Literal("$x".into());
        assert_eq!(t.expand(&env), vec!["$x".to_string()]);
    }

    #[test]
    fn test_expandable_substitutes() {
        let env = env_with(&[("x", "5")]);
        let t = Token::Expandable("a$x b".into());
        assert_eq!(t.expand(&env), vec!["a5 b".to_string()]);
    }

    #[test]
    fn test_braced_and_bare_equivalent() {
        let env = env_with(&[("name", "val")]);
        assert_eq!(expand_text("$name", &env), "val");
        assert_eq!(expand_text("${name}", &env), "val");
        assert_eq!(expand_text("x${name}y", &env), "xvaly");
    }

    #[test]
    fn test_missing_name_expands_to_default() {
        let env = env_with(&[]);
        assert_eq!(expand_text("<$nothing>", &env), "<>");
    }

    #[test]
    fn test_bare_dollar_stays_literal() {
        let env = env_with(&[("b", "B")]);
        assert_eq!(expand_text("cost$", &env), "cost$");
        assert_eq!(expand_text("$", &env), "$");
        assert_eq!(expand_text("$$", &env), "$$");
        assert_eq!(expand_text("$$b", &env), "$B");
        assert_eq!(expand_text("100$%", &env), "100$%");
    }

    #[test]
    fn test_unterminated_brace_stays_literal() {
        let env = env_with(&[("x", "5")]);
        assert_eq!(expand_text("${x", &env), "${x");
        assert_eq!(expand_text("${}", &env), "${}");
    }

    #[test]
    fn test_special_names() {
        let mut env = Environment::new("test", "");
        env.bind("?", "0");
        env.bind("#", "2");
        env.bind("@", "a b");
        env.bind("1", "a");
        assert_eq!(expand_text("$?", &env), "0");
        assert_eq!(expand_text("$#", &env), "2");
        assert_eq!(expand_text("$@", &env), "a b");
        assert_eq!(expand_text("$1", &env), "a");
    }

    #[test]
    fn test_expansion_idempotent_on_literals() {
        let env = env_with(&[("x", "5")]);
        let t = Token::Literal("keep $x".into());
        let once = t.expand(&env);
        let again = Token::Literal(once[0].clone()).expand(&env);
        assert_eq!(once, again);
    }

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("foo"));
        assert!(is_valid_name("_bar"));
        assert!(is_valid_name("?"));
        assert!(is_valid_name("1"));
        assert!(is_valid_name("with-dash"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("has space"));
        assert!(!is_valid_name("pi$"));
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("two words"), "\"two words\"");
        assert_eq!(quote("a|b"), "\"a|b\"");
        assert_eq!(quote("a#b"), "\"a#b\"");
    }
}
