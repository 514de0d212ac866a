//! Line Sources
//!
//! Line input is pluggable: the interpreter only asks for the next line
//! given a prompt. The interactive default wraps a `rustyline` editor with a
//! file-backed history; piped input falls back to plain stdin reads; tests
//! feed lines from memory.

use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;

use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;

/// Where the run loop reads lines from.
pub trait LineSource {
    /// The next line, or `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Option<String>;

    /// Called once before the run loop starts, with the history dotfile.
    fn on_start(&mut self, _history: &Path, _max_len: usize) {}

    /// Called once when the run loop ends.
    fn on_exit(&mut self, _history: &Path) {}
}

/// Plain stdin. Shows the prompt only when stdin is a terminal, so piped
/// scripts stay clean.
pub struct StdinSource {
    interactive: bool,
}

impl StdinSource {
    pub fn new() -> Self {
        Self { interactive: io::stdin().is_terminal() }
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSource for StdinSource {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        if self.interactive {
            eprint!("{}", prompt);
            let _ = io::stderr().flush();
        }
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(_) => None,
        }
    }
}

/// A fixed script of lines, for tests and embedded drivers.
pub struct MemorySource {
    lines: VecDeque<String>,
}

impl MemorySource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { lines: lines.into_iter().map(Into::into).collect() }
    }
}

impl LineSource for MemorySource {
    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        self.lines.pop_front()
    }
}

/// The interactive editor: line editing, interrupt handling, and persistent
/// history.
pub struct RustylineSource {
    editor: rustyline::Editor<(), FileHistory>,
}

impl RustylineSource {
    pub fn new(history_length: usize) -> rustyline::Result<Self> {
        let config = rustyline::Config::builder()
            .max_history_size(history_length)?
            .auto_add_history(false)
            .build();
        Ok(Self { editor: rustyline::Editor::with_config(config)? })
    }
}

impl LineSource for RustylineSource {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        loop {
            match self.editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = self.editor.add_history_entry(line.as_str());
                    }
                    return Some(line);
                }
                // ^C drops the partial line and prompts again
                Err(ReadlineError::Interrupted) => continue,
                Err(_) => return None,
            }
        }
    }

    fn on_start(&mut self, history: &Path, _max_len: usize) {
        let _ = self.editor.load_history(history);
    }

    fn on_exit(&mut self, history: &Path) {
        let _ = self.editor.save_history(history);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_drains() {
        let mut source = MemorySource::new(["one", "two"]);
        assert_eq!(source.read_line(">"), Some("one".to_string()));
        assert_eq!(source.read_line(">"), Some("two".to_string()));
        assert_eq!(source.read_line(">"), None);
    }
}
