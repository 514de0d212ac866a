//! Loop Blocks
//!
//! `while PRED` … `done`. The builder collects the body; execution at `done`
//! re-evaluates the predicate before each pass and runs the body while `?`
//! is 0. `break` ends the loop normally, `shift` is delegated to the
//! enclosing function frame, and `return` keeps unwinding.

use crate::interpreter::blocks::{Block, BlockOutcome};
use crate::interpreter::errors::{ControlSignal, ReplError};
use crate::repl::Repl;

pub struct LoopBuilder {
    condition: String,
    lines: Vec<String>,
}

impl LoopBuilder {
    pub fn new(condition: &str) -> Self {
        Self { condition: condition.to_string(), lines: Vec::new() }
    }

    pub fn append(mut self, line: &str) -> BlockOutcome {
        let line = line.trim();
        if line == "done" {
            return BlockOutcome::CompletedLoop(self);
        }
        self.lines.push(line.to_string());
        BlockOutcome::Open(Block::Loop(self))
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn body(&self) -> &[String] {
        &self.lines
    }
}

impl Repl {
    /// Run a completed loop.
    pub(crate) fn run_loop(&mut self, block: LoopBuilder) -> Result<(), ReplError> {
        self.eval_and_show(block.condition())?;
        'iterations: while self.get("?") == "0" {
            for line in block.body() {
                match self.eval(line) {
                    Ok(output) => {
                        if !output.is_empty() {
                            let trimmed = output.trim_matches('\n').to_string();
                            self.println(&trimmed);
                        }
                    }
                    Err(ReplError::Signal(ControlSignal::Break)) => break 'iterations,
                    Err(ReplError::Signal(ControlSignal::Shift)) => {
                        self.shift_current_frame()?;
                    }
                    Err(e) => return Err(e),
                }
            }
            self.eval_and_show(block.condition())?;
        }
        Ok(())
    }

    fn eval_and_show(&mut self, line: &str) -> Result<(), ReplError> {
        let output = self.eval(line)?;
        if !output.is_empty() {
            let trimmed = output.trim_matches('\n').to_string();
            self.println(&trimmed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_until_done() {
        let builder = LoopBuilder::new("greater-than $n 0");
        let BlockOutcome::Open(block) = builder.append("echo $n") else {
            panic!("expected open block");
        };
        match block.append("done") {
            BlockOutcome::CompletedLoop(done) => {
                assert_eq!(done.condition(), "greater-than $n 0");
                assert_eq!(done.body(), ["echo $n"]);
            }
            _ => panic!("expected completion"),
        }
    }
}
