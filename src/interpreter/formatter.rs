//! Source Formatter
//!
//! Reconstructs block bodies with 4-space indentation for help text. Depth is
//! driven by two keyword tables: indent after `function|while|if|elif|else`,
//! dedent at `elif|else|endif|endfunction|done`.

const INDENT_AFTER: &[&str] = &["function", "while", "if", "elif", "else"];
const DEDENT_AT: &[&str] = &["elif", "else", "endif", "endfunction", "done"];

const INDENT_SIZE: usize = 4;

fn first_word(line: &str) -> &str {
    line.trim().split_whitespace().next().unwrap_or("")
}

/// Indent `lines` starting at `base_depth` levels.
pub fn format(lines: &[String], base_depth: usize) -> String {
    let mut formatted = Vec::with_capacity(lines.len());
    let mut depth = base_depth;

    for line in lines {
        let word = first_word(line);
        if DEDENT_AT.contains(&word) {
            depth = depth.saturating_sub(1);
        }
        formatted.push(format!("{}{}", " ".repeat(depth * INDENT_SIZE), line.trim()));
        if INDENT_AFTER.contains(&word) {
            depth += 1;
        }
    }

    formatted.join("\n")
}
