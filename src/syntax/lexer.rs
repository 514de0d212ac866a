//! Lexer for Command Lines
//!
//! Turns one logical line into an ordered token list honoring the quoting
//! rules:
//! - `'…'` produces Literal text, `"…"` produces Expandable text; a
//!   backslash immediately before a quote makes it an ordinary character
//! - unquoted text splits on spaces and tabs; a backslash escapes one
//!   whitespace character, which is kept in the token
//! - the first unescaped `#` outside quotes starts a comment (`$#` does not)
//! - unquoted, unescaped `` ` `` and `|` break out as single-character raw
//!   tokens
//! - adjacent quoted and unquoted pieces glue into one word (`a"b"c` is the
//!   single word `abc`); the word is Literal only when every piece was
//!   single-quoted
//!
//! After lexing, the only Raw tokens left are the two metacharacters.

use crate::interpreter::errors::ReplError;
use crate::syntax::token::Token;

#[derive(Clone, Copy, PartialEq, Eq)]
enum PartKind {
    Bare,
    Double,
    Single,
}

struct WordPart {
    kind: PartKind,
    text: String,
}

/// Lex a single line. Fails only on an unmatched quote.
pub fn lex(line: &str) -> Result<Vec<Token>, ReplError> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens: Vec<Token> = Vec::new();
    let mut parts: Vec<WordPart> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            ' ' | '\t' => {
                flush_word(&mut parts, &mut tokens);
                i += 1;
            }
            quote @ ('\'' | '"') => {
                let kind = if quote == '\'' { PartKind::Single } else { PartKind::Double };
                let mut text = String::new();
                let mut closed = false;
                i += 1;
                while i < chars.len() {
                    if chars[i] == '\\' && i + 1 < chars.len() && chars[i + 1] == quote {
                        text.push(quote);
                        i += 2;
                        continue;
                    }
                    if chars[i] == quote {
                        closed = true;
                        i += 1;
                        break;
                    }
                    text.push(chars[i]);
                    i += 1;
                }
                if !closed {
                    return Err(ReplError::syntax("Unmatched quote"));
                }
                parts.push(WordPart { kind, text });
            }
            '\\' => {
                // In unquoted context a backslash only escapes the characters
                // the lexer would otherwise act on; before anything else it
                // is an ordinary character.
                if i + 1 < chars.len()
                    && matches!(chars[i + 1], '\'' | '"' | ' ' | '\t' | '#' | '`' | '|' | '\\')
                {
                    push_bare(&mut parts, chars[i + 1]);
                    i += 2;
                } else {
                    push_bare(&mut parts, '\\');
                    i += 1;
                }
            }
            '#' => {
                // `$#` is a variable reference, not a comment.
                let after_dollar = matches!(
                    parts.last(),
                    Some(WordPart { kind: PartKind::Bare, text }) if text.ends_with('$')
                );
                if after_dollar {
                    push_bare(&mut parts, '#');
                    i += 1;
                } else {
                    break;
                }
            }
            meta @ ('`' | '|') => {
                flush_word(&mut parts, &mut tokens);
                tokens.push(Token::Raw(meta.to_string()));
                i += 1;
            }
            c => {
                push_bare(&mut parts, c);
                i += 1;
            }
        }
    }

    flush_word(&mut parts, &mut tokens);
    Ok(tokens)
}

fn push_bare(parts: &mut Vec<WordPart>, c: char) {
    match parts.last_mut() {
        Some(part) if part.kind == PartKind::Bare => part.text.push(c),
        _ => parts.push(WordPart { kind: PartKind::Bare, text: c.to_string() }),
    }
}

fn flush_word(parts: &mut Vec<WordPart>, tokens: &mut Vec<Token>) {
    if parts.is_empty() {
        return;
    }
    let all_single = parts.iter().all(|p| p.kind == PartKind::Single);
    let text: String = parts.drain(..).map(|p| p.text).collect();
    if all_single {
        tokens.push(Token::Literal(text));
    } else {
        tokens.push(Token::Expandable(text));
    }
}
