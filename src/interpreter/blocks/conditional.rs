//! Conditional Blocks
//!
//! `if PRED` … `elif PRED` … `else` … `endif`. The builder keeps the chain of
//! (predicate, body) pairs; `else` enters the chain as `elif true`, and an
//! `else` in the middle of the chain is accepted even though it makes the
//! rest unreachable. Execution happens when `endif` closes the block.

use crate::interpreter::blocks::{Block, BlockOutcome};
use crate::interpreter::errors::{ControlSignal, ReplError};
use crate::repl::Repl;

pub struct ConditionalBuilder {
    condition: String,
    block: Vec<String>,
    chain: Vec<(String, Vec<String>)>,
}

impl ConditionalBuilder {
    pub fn new(condition: &str) -> Self {
        Self { condition: condition.to_string(), block: Vec::new(), chain: Vec::new() }
    }

    pub fn append(mut self, line: &str) -> BlockOutcome {
        let line = line.trim();
        let first = line.split_whitespace().next().unwrap_or("");

        if line == "endif" {
            self.rotate(None);
            return BlockOutcome::CompletedConditional(self);
        }
        if first == "elif" {
            let predicate = line["elif".len()..].trim();
            if predicate.is_empty() {
                return BlockOutcome::Discarded(ReplError::syntax(
                    "Conditional block must have predicate",
                ));
            }
            self.rotate(Some(predicate.to_string()));
            return BlockOutcome::Open(Block::Conditional(self));
        }
        if first == "else" {
            self.rotate(Some("true".to_string()));
            return BlockOutcome::Open(Block::Conditional(self));
        }

        self.block.push(line.to_string());
        BlockOutcome::Open(Block::Conditional(self))
    }

    /// Close the current (predicate, body) pair and start the next one.
    fn rotate(&mut self, next_condition: Option<String>) {
        let condition = std::mem::take(&mut self.condition);
        let block = std::mem::take(&mut self.block);
        self.chain.push((condition, block));
        if let Some(next) = next_condition {
            self.condition = next;
        }
    }

    pub fn into_chain(self) -> Vec<(String, Vec<String>)> {
        self.chain
    }
}

impl Repl {
    /// Run a completed conditional: evaluate predicates in order and execute
    /// the first body whose predicate leaves `?` at 0.
    pub(crate) fn run_conditional(
        &mut self,
        chain: Vec<(String, Vec<String>)>,
    ) -> Result<(), ReplError> {
        for (predicate, body) in chain {
            self.eval(&predicate)?;
            if self.get("?") != "0" {
                continue;
            }
            for line in body {
                match self.eval(&line) {
                    Ok(output) => {
                        if !output.is_empty() {
                            let trimmed = output.trim_matches('\n').to_string();
                            self.println(&trimmed);
                        }
                    }
                    Err(ReplError::Signal(ControlSignal::Shift)) => {
                        self.shift_current_frame()?;
                    }
                    Err(e) => return Err(e),
                }
            }
            return Ok(());
        }
        Ok(())
    }
}
