//! Block Builders
//!
//! While a `function`, `if`, or `while` is open, input lines are routed to
//! the topmost builder instead of being evaluated. Each builder owns its own
//! buffer and reports, per appended line, whether it is still collecting,
//! complete, or discarded by an error. Completion either registers a
//! callable (function) or hands the collected block back to the evaluator to
//! run (conditional, loop).

pub mod conditional;
pub mod function;
pub mod loop_block;

pub use conditional::ConditionalBuilder;
pub use function::{FunctionBuilder, FunctionFrame, ReplFunction};
pub use loop_block::LoopBuilder;

use crate::interpreter::errors::ReplError;

/// A block under construction.
pub enum Block {
    Function(FunctionBuilder),
    Conditional(ConditionalBuilder),
    Loop(LoopBuilder),
}

/// What happened to the block after one appended line.
pub enum BlockOutcome {
    /// Still collecting lines.
    Open(Block),
    /// `endfunction` seen; register the function.
    CompletedFunction(FunctionBuilder),
    /// `endif` seen; run the chain.
    CompletedConditional(ConditionalBuilder),
    /// `done` seen; run the loop.
    CompletedLoop(LoopBuilder),
    /// The block is dropped; report the error.
    Discarded(ReplError),
}

impl Block {
    /// Builder name shown in the continuation prompt.
    pub fn name(&self) -> &str {
        match self {
            Block::Function(f) => f.name(),
            Block::Conditional(_) => "Conditional",
            Block::Loop(_) => "Loop",
        }
    }

    pub fn append(self, line: &str) -> BlockOutcome {
        match self {
            Block::Function(builder) => builder.append(line),
            Block::Conditional(builder) => builder.append(line),
            Block::Loop(builder) => builder.append(line),
        }
    }
}
