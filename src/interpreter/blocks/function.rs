//! User Functions
//!
//! `FunctionBuilder` collects body lines between `function NAME [args…]` and
//! `endfunction`. The registered `ReplFunction` stores the body as source
//! lines and re-enters the evaluator for each one at call time, under a
//! fresh scope holding the positional bindings.

use std::collections::HashMap;
use std::rc::Rc;

use crate::interpreter::command::Arity;
use crate::interpreter::errors::{ControlSignal, ReplError};
use crate::interpreter::{blocks::Block, blocks::BlockOutcome, formatter};
use crate::repl::Repl;
use crate::syntax::token::quote;

/// Nested user-function invocations beyond this fail instead of exhausting
/// the host stack.
pub const MAX_RECURSION_DEPTH: usize = 1000;

/// A registered user function: fixed formals, optional variadic tail, and
/// the body verbatim.
#[derive(Debug, Clone)]
pub struct ReplFunction {
    pub name: String,
    pub argspec: Vec<String>,
    pub variadic: bool,
    pub body: Vec<String>,
}

impl ReplFunction {
    pub fn usage_string(&self) -> String {
        if self.argspec.is_empty() && !self.variadic {
            format!("{} args", self.name)
        } else {
            format!("{} {}", self.name, self.spec_display())
        }
    }

    /// The source, reconstructed with 4-space indentation.
    pub fn help_string(&self) -> String {
        let opener = if self.argspec.is_empty() && !self.variadic {
            format!("function {}", self.name)
        } else {
            format!("function {} {}", self.name, self.spec_display())
        };
        format!("{}\n{}\nendfunction", opener, formatter::format(&self.body, 1))
    }

    pub fn arity(&self) -> Arity {
        if self.variadic {
            Arity::at_least(self.argspec.len())
        } else if self.argspec.is_empty() {
            Arity::any()
        } else {
            Arity::exact(self.argspec.len())
        }
    }

    fn spec_display(&self) -> String {
        let mut parts = self.argspec.clone();
        if self.variadic {
            parts.push("...".to_string());
        }
        parts.join(" ")
    }
}

/// Collects a function body until `endfunction`.
pub struct FunctionBuilder {
    name: String,
    argspec: Vec<String>,
    variadic: bool,
    lines: Vec<String>,
}

impl FunctionBuilder {
    pub fn new(name: &str, argspec: Vec<String>, variadic: bool) -> Self {
        Self { name: name.to_string(), argspec, variadic, lines: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn append(mut self, line: &str) -> BlockOutcome {
        let line = line.trim();
        if line == "endfunction" {
            return BlockOutcome::CompletedFunction(self);
        }
        // Function lifetime and scope would get murky, so nested definitions
        // are rejected and the whole block is dropped.
        if line.split_whitespace().next() == Some("function") {
            return BlockOutcome::Discarded(ReplError::runtime("Cannot create nested functions"));
        }
        self.lines.push(line.to_string());
        BlockOutcome::Open(Block::Function(self))
    }

    pub fn into_function(self) -> ReplFunction {
        ReplFunction {
            name: self.name,
            argspec: self.argspec,
            variadic: self.variadic,
            body: self.lines,
        }
    }
}

/// Per-invocation positional state, kept so `shift` can rebuild the
/// bindings while the body runs.
#[derive(Debug, Clone)]
pub struct FunctionFrame {
    pub name: String,
    pub args: Vec<String>,
    pub argspec: Vec<String>,
    pub scope_index: usize,
}

impl FunctionFrame {
    pub fn new(function: &ReplFunction, args: &[String]) -> Self {
        Self {
            name: function.name.clone(),
            args: args.to_vec(),
            argspec: function.argspec.clone(),
            scope_index: 0,
        }
    }

    /// The positional bindings for the current args/formals.
    pub fn bindings(&self) -> HashMap<String, String> {
        let mut bindings = HashMap::new();
        bindings.insert("FUNCTION".to_string(), self.name.clone());
        bindings.insert("0".to_string(), self.name.clone());
        bindings.insert("#".to_string(), self.args.len().to_string());
        bindings.insert(
            "@".to_string(),
            self.args.iter().map(|a| quote(a)).collect::<Vec<_>>().join(" "),
        );
        for (position, argument) in self.args.iter().enumerate() {
            bindings.insert((position + 1).to_string(), argument.clone());
        }
        for (formal, argument) in self.argspec.iter().zip(self.args.iter()) {
            bindings.insert(formal.clone(), argument.clone());
        }
        bindings
    }
}

impl Repl {
    /// Invoke a user function. Arity has already been checked at dispatch.
    pub(crate) fn run_function(
        &mut self,
        function: Rc<ReplFunction>,
        args: &[String],
    ) -> Result<i32, ReplError> {
        if self.frames_len() >= MAX_RECURSION_DEPTH {
            return Err(ReplError::runtime("Maximum recursion depth exceeded"));
        }

        let mut frame = FunctionFrame::new(&function, args);
        let bindings = frame.bindings();
        frame.scope_index = self.push_scope(&function.name, bindings);
        self.push_frame(frame);

        let mut outcome: Result<i32, ReplError> = Ok(0);
        for line in function.body.iter() {
            match self.eval(line) {
                Ok(output) => {
                    self.bump_call_line();
                    if !output.is_empty() {
                        let trimmed = output.trim_matches('\n').to_string();
                        self.println(&trimmed);
                    }
                }
                Err(ReplError::Signal(ControlSignal::Return(value))) => {
                    outcome = Ok(value.and_then(|v| v.parse().ok()).unwrap_or(0));
                    break;
                }
                Err(ReplError::Signal(ControlSignal::Shift)) => {
                    if let Err(e) = self.shift_current_frame() {
                        outcome = Err(e);
                        break;
                    }
                }
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }

        self.pop_frame();
        self.pop_scope();
        outcome
    }

    /// Drop the first positional of the innermost function invocation and
    /// rebuild its bindings. Shifting past the last positional is a no-op;
    /// shifting with no function in flight re-raises the signal so the top
    /// level reports it.
    pub(crate) fn shift_current_frame(&mut self) -> Result<(), ReplError> {
        let Some(frame) = self.top_frame_mut() else {
            return Err(ControlSignal::Shift.into());
        };

        let old_len = frame.args.len();
        if old_len == 0 {
            return Ok(());
        }

        frame.args.remove(0);
        let dropped_formal = if frame.args.len() < frame.argspec.len() {
            Some(frame.argspec.remove(0))
        } else {
            None
        };
        let bindings = frame.bindings();
        let scope = frame.scope_index;

        self.unbind_at(scope, &old_len.to_string());
        if let Some(formal) = dropped_formal {
            self.unbind_at(scope, &formal);
        }
        for (name, value) in bindings {
            self.bind_at(scope, &name, &value);
        }
        Ok(())
    }
}
