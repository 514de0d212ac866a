//! The Interpreter Instance
//!
//! `Repl` owns everything the evaluator touches: the scope chain, the four
//! command namespaces, the call stack, the block-under-construction stack,
//! the capture stack, and the stdin slot pipelines retarget. Hosts construct
//! one with `ReplOptions`, register commands against it, and either drive it
//! line by line with `eval` or hand over control with `run`.

use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use crate::config::{ConfigStore, FileVarsStore};
use crate::input::{LineSource, StdinSource};
use crate::interpreter::blocks::{Block, FunctionFrame, ReplFunction};
use crate::interpreter::callstack::CallStack;
use crate::interpreter::command::{Arity, Command};
use crate::interpreter::environment::Environment;
use crate::interpreter::errors::{ControlSignal, ReplError};
use crate::interpreter::registry::Registry;
use crate::interpreter::sink::{SharedBuffer, Wiretap};

pub(crate) const RESULT_VAR: &str = "?";
pub(crate) const MAX_SOURCE_DEPTH: u32 = 500;

const STARTUP_FILE_PATTERN: &str = ".{}rc";
const HISTORY_FILE_PATTERN: &str = ".{}_history";
const CONFIGS_FILE_PATTERN: &str = ".{}_vars";

/// Construction options. Everything has a sensible default; hosts fill in
/// only what they care about.
pub struct ReplOptions {
    pub application_name: String,
    /// Pre-seeded outermost scope, upstream of the configuration scope.
    pub upstream_bindings: Option<HashMap<String, String>>,
    pub dotfile_prefix: Option<String>,
    pub dotfile_root: Option<PathBuf>,
    pub history_length: usize,
    /// Trace every command to the error sink.
    pub echo: bool,
    pub modules_enabled: Vec<String>,
    /// Propagate evaluation errors out of `run` instead of recovering.
    pub debug: bool,
    /// Don't register the builtin commands.
    pub noinit: bool,
    /// Don't source the startup dotfile.
    pub nodotfile: bool,
    /// Don't create the configuration scope or its store.
    pub noenv: bool,
    pub input: Option<Box<dyn LineSource>>,
    pub output: Option<Box<dyn Write>>,
    pub error: Option<Box<dyn Write>>,
    /// Replaces the default JSON dotfile store for configuration variables.
    pub config_store: Option<Box<dyn ConfigStore>>,
}

impl Default for ReplOptions {
    fn default() -> Self {
        Self {
            application_name: "repl".to_string(),
            upstream_bindings: None,
            dotfile_prefix: None,
            dotfile_root: None,
            history_length: 1000,
            echo: false,
            modules_enabled: Vec::new(),
            debug: false,
            noinit: false,
            nodotfile: false,
            noenv: false,
            input: None,
            output: None,
            error: None,
            config_store: None,
        }
    }
}

pub struct Repl {
    pub(crate) name: String,
    pub(crate) echo: bool,
    pub(crate) debug: bool,
    pub(crate) done: bool,
    pub(crate) dotfile_prefix: String,
    pub(crate) dotfile_root: PathBuf,
    pub(crate) history_length: usize,

    pub(crate) env: Environment,
    pub(crate) config_scope: Option<usize>,
    pub(crate) registry: Registry,
    pub(crate) unknown_factory: Rc<dyn Fn(&str) -> Command>,

    pub(crate) blocks: Vec<Block>,
    pub(crate) call_stack: CallStack,
    pub(crate) frames: Vec<FunctionFrame>,
    pub(crate) captures: Vec<Wiretap>,
    pub(crate) stdin_slot: Option<VecDeque<String>>,

    pub(crate) prompt_fn: Option<Rc<dyn Fn(&Repl) -> String>>,
    pub(crate) input: Box<dyn LineSource>,
    pub(crate) output: Box<dyn Write>,
    pub(crate) error: Box<dyn Write>,
    pub(crate) config_store: Option<Box<dyn ConfigStore>>,

    pub(crate) modules_loaded: Vec<String>,
    pub(crate) source_depth: u32,
}

impl Repl {
    pub fn new(options: ReplOptions) -> Self {
        let name = options.application_name;
        let dotfile_prefix = options.dotfile_prefix.unwrap_or_else(|| name.clone());
        let dotfile_root = options
            .dotfile_root
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        let mut env = Environment::empty("");
        if let Some(upstream) = options.upstream_bindings {
            env.push_scope("upstream", upstream);
        }
        let config_scope = if options.noenv {
            None
        } else {
            Some(env.push_scope(&format!("{}-env", name), HashMap::new()))
        };
        env.push_scope(&name, HashMap::new());

        let mut repl = Repl {
            name,
            echo: options.echo,
            debug: options.debug,
            done: false,
            dotfile_prefix,
            dotfile_root,
            history_length: options.history_length,
            env,
            config_scope,
            registry: Registry::new(),
            unknown_factory: Rc::new(make_unknown_command),
            blocks: Vec::new(),
            call_stack: CallStack::new(),
            frames: Vec::new(),
            captures: Vec::new(),
            stdin_slot: None,
            prompt_fn: None,
            input: options.input.unwrap_or_else(|| Box::new(StdinSource::new())),
            output: options.output.unwrap_or_else(|| Box::new(std::io::stdout())),
            error: options.error.unwrap_or_else(|| Box::new(std::io::stderr())),
            config_store: None,
            modules_loaded: Vec::new(),
            source_depth: 0,
        };

        repl.env.bind_here(RESULT_VAR, "0");
        let name_binding = repl.name.clone();
        repl.env.bind_here("0", &name_binding);

        if !options.noinit {
            crate::builtins::install(&mut repl);
        }

        if config_scope.is_some() {
            let store = options.config_store.unwrap_or_else(|| {
                Box::new(FileVarsStore::new(repl.vars_file()))
            });
            repl.config_store = Some(store);
            repl.load_config_vars();
        }

        let modules = options.modules_enabled;
        for module in modules {
            if let Err(e) = repl.enable_module(&module) {
                let message = e.to_string();
                repl.error_line(&message);
            }
        }

        if !options.nodotfile {
            let startup = repl.startup_file();
            let _ = repl.source(&startup, true);
        }

        repl
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register a host command into the basis.
    pub fn register(&mut self, command: Command) -> &mut Self {
        self.registry.basis.insert(command.name().to_string(), command);
        self
    }

    /// Register (or overwrite) a user function.
    pub fn register_user_function(&mut self, command: Command) -> &mut Self {
        self.registry.functions.insert(command.name().to_string(), command);
        self
    }

    /// Remove a user function; missing names are a no-op.
    pub fn unregister(&mut self, name: &str) -> &mut Self {
        self.registry.functions.shift_remove(name);
        self
    }

    pub(crate) fn register_function(&mut self, function: ReplFunction) {
        let command = Command::from_function(Rc::new(function));
        self.register_user_function(command);
    }

    /// Snapshot `target` under `alias`, refusing silently when the target
    /// does not resolve.
    pub(crate) fn add_alias(&mut self, alias: &str, target: &str) {
        let bare = target.strip_prefix('\\').unwrap_or(target);
        if !self.registry.resolves(bare) {
            return;
        }
        let command = self.lookup_command(target).renamed(alias);
        self.registry.aliases.insert(alias.to_string(), command);
    }

    pub fn set_prompt<F>(&mut self, prompt: F) -> &mut Self
    where
        F: Fn(&Repl) -> String + 'static,
    {
        self.prompt_fn = Some(Rc::new(prompt));
        self
    }

    /// Replace the factory that synthesizes commands for unresolved names.
    pub fn set_unknown_command<F>(&mut self, factory: F) -> &mut Self
    where
        F: Fn(&str) -> Command + 'static,
    {
        self.unknown_factory = Rc::new(factory);
        self
    }

    // ------------------------------------------------------------------
    // Variables
    // ------------------------------------------------------------------

    pub fn set(&mut self, name: &str, value: &str) -> &mut Self {
        self.env.bind(name, value);
        self
    }

    pub fn set_local(&mut self, name: &str, value: &str) -> &mut Self {
        self.env.bind_here(name, value);
        self
    }

    pub fn get(&self, name: &str) -> String {
        self.env.get(name)
    }

    pub fn unset(&mut self, name: &str) -> &mut Self {
        self.env.unbind(name);
        self
    }

    pub(crate) fn bind_result(&mut self, status: i32) {
        self.env.bind(RESULT_VAR, &status.to_string());
    }

    // ------------------------------------------------------------------
    // Run loop
    // ------------------------------------------------------------------

    /// Read-eval-print until `quit`/`exit` or end of input. In debug mode
    /// evaluation errors propagate to the caller; otherwise they become
    /// one-line diagnostics and the loop resumes.
    pub fn run(&mut self) -> Result<(), ReplError> {
        let history = self.history_file();
        let history_length = self.history_length;
        self.input.on_start(&history, history_length);

        while !self.done {
            let prompt = self.prompt();
            let Some(line) = self.input.read_line(&prompt) else { break };
            let line = line.trim_end_matches('\n').to_string();
            match self.eval(&line) {
                Ok(output) => {
                    if !output.is_empty() {
                        self.write_output(&output);
                    }
                }
                Err(ReplError::Signal(ControlSignal::Break)) => {
                    self.error_line("Cannot break when not executing a loop");
                }
                Err(ReplError::Signal(ControlSignal::Return(_))) => {
                    self.error_line("Cannot return from outside of function");
                }
                Err(ReplError::Signal(ControlSignal::Shift)) => {
                    self.error_line("Cannot shift from outside of function");
                }
                Err(e) => {
                    if self.debug {
                        self.input.on_exit(&history);
                        self.write_config();
                        return Err(e);
                    }
                    let message = e.to_string();
                    self.error_line(&message);
                }
            }
        }

        self.input.on_exit(&history);
        self.write_config();
        Ok(())
    }

    pub fn done(&self) -> bool {
        self.done
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn echo(&self) -> bool {
        self.echo
    }

    pub fn set_echo(&mut self, echo: bool) -> &mut Self {
        self.echo = echo;
        self
    }

    pub fn loaded_modules(&self) -> &[String] {
        &self.modules_loaded
    }

    pub fn prompt(&self) -> String {
        match &self.prompt_fn {
            Some(prompt) => prompt(self),
            None => self.default_prompt(),
        }
    }

    /// Command names starting with `text`, in lookup order, for line sources
    /// that offer tab completion. A leading escape character reverses the
    /// order, mirroring dispatch.
    pub fn completions(&self, text: &str) -> Vec<String> {
        let mut candidates: Vec<String> =
            self.registry.all_names().iter().map(|s| s.to_string()).collect();
        let text = match text.strip_prefix('\\') {
            Some(rest) => {
                candidates.reverse();
                rest
            }
            None => text,
        };
        candidates.retain(|c| c.starts_with(text.trim()));
        candidates
    }

    fn default_prompt(&self) -> String {
        if !self.blocks.is_empty() {
            let chain: Vec<&str> = self.blocks.iter().map(Block::name).collect();
            format!("({}/{}) ... ", self.name, chain.join("/"))
        } else if self.name == "repl" {
            ">>> ".to_string()
        } else {
            format!("({}) >>> ", self.name)
        }
    }

    // ------------------------------------------------------------------
    // Dotfiles and configuration
    // ------------------------------------------------------------------

    pub(crate) fn startup_file(&self) -> PathBuf {
        self.dotfile_root.join(STARTUP_FILE_PATTERN.replace("{}", &self.dotfile_prefix))
    }

    pub(crate) fn history_file(&self) -> PathBuf {
        self.dotfile_root.join(HISTORY_FILE_PATTERN.replace("{}", &self.dotfile_prefix))
    }

    pub(crate) fn vars_file(&self) -> PathBuf {
        self.dotfile_root.join(CONFIGS_FILE_PATTERN.replace("{}", &self.dotfile_prefix))
    }

    fn load_config_vars(&mut self) {
        let Some(index) = self.config_scope else { return };
        let Some(store) = &self.config_store else { return };
        match store.open_load() {
            Ok(Some(mut reader)) => {
                if self.env.load_from(index, reader.as_mut()).is_err() {
                    let message = format!(
                        "Error reading config variables from {}",
                        self.vars_file().display()
                    );
                    self.error_line(&message);
                }
            }
            Ok(None) => {}
            Err(_) => {}
        }
    }

    /// Flush the configuration scope through the store. Called on orderly
    /// shutdown of `run`, and available to hosts that never call `run`.
    pub fn write_config(&mut self) {
        let Some(index) = self.config_scope else { return };
        let Some(store) = &self.config_store else { return };
        if let Ok(mut writer) = store.open_save() {
            let _ = self.env.write_to(index, writer.as_mut());
        }
    }

    // ------------------------------------------------------------------
    // Sinks and the stdin slot
    // ------------------------------------------------------------------

    /// Write to the innermost capture, or the output sink outside any
    /// command invocation.
    pub fn print(&mut self, s: &str) {
        match self.captures.last_mut() {
            Some(tap) => tap.write_str(s),
            None => {
                let _ = self.output.write_all(s.as_bytes());
                let _ = self.output.flush();
            }
        }
    }

    pub fn println(&mut self, s: &str) {
        self.print(s);
        self.print("\n");
    }

    pub(crate) fn write_output(&mut self, s: &str) {
        let _ = self.output.write_all(s.as_bytes());
        let _ = self.output.flush();
    }

    /// Diagnostics bypass capture and go straight to the error sink.
    pub fn error_line(&mut self, s: &str) {
        let _ = writeln!(self.error, "{}", s);
        let _ = self.error.flush();
    }

    pub(crate) fn push_capture(&mut self, listener: Option<SharedBuffer>) {
        let mut tap = Wiretap::new();
        if let Some(listener) = listener {
            tap.join(listener);
        }
        self.captures.push(tap);
    }

    pub(crate) fn pop_capture(&mut self) -> String {
        self.captures.pop().map(Wiretap::into_value).unwrap_or_default()
    }

    /// The next line of pipeline stdin, if a pipeline retargeted it.
    pub fn read_stdin_line(&mut self) -> Option<String> {
        self.stdin_slot.as_mut()?.pop_front()
    }

    // ------------------------------------------------------------------
    // Scope and frame plumbing for the evaluator
    // ------------------------------------------------------------------

    pub(crate) fn push_scope(&mut self, name: &str, initial: HashMap<String, String>) -> usize {
        self.env.push_scope(name, initial)
    }

    pub(crate) fn pop_scope(&mut self) {
        self.env.pop_scope();
    }

    pub(crate) fn bind_at(&mut self, index: usize, name: &str, value: &str) {
        self.env.bind_at(index, name, value);
    }

    pub(crate) fn unbind_at(&mut self, index: usize, name: &str) {
        self.env.unbind_at(index, name);
    }

    pub(crate) fn frames_len(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn push_frame(&mut self, frame: FunctionFrame) {
        self.frames.push(frame);
    }

    pub(crate) fn pop_frame(&mut self) {
        self.frames.pop();
    }

    pub(crate) fn top_frame_mut(&mut self) -> Option<&mut FunctionFrame> {
        self.frames.last_mut()
    }

    pub(crate) fn bump_call_line(&mut self) {
        if let Some(entry) = self.call_stack.top_mut() {
            entry.line_number += 1;
        }
    }
}

/// The default synthetic command for unresolved names.
fn make_unknown_command(name: &str) -> Command {
    let message = format!("Unknown command: {}", name);
    let help = message.clone();
    Command::new("Unknown", "Unknown", &help, Arity::any(), move |repl, _args| {
        repl.println(&message);
        Ok(1)
    })
}
