//! Output Sinks
//!
//! `Wiretap` is the capture sink every command writes through: it accumulates
//! writes in a buffer that the evaluator reads back when the command
//! finishes, and forwards each write to any attached listeners unless gagged.
//! Pipelines attach a shared buffer as a listener so a stage's output can be
//! retargeted as the next stage's stdin while the normal capture still sees
//! it.

use std::cell::RefCell;
use std::fmt;
use std::io;
use std::rc::Rc;

/// A shared string buffer, the StringIO of this crate.
pub type SharedBuffer = Rc<RefCell<String>>;

pub fn shared_buffer() -> SharedBuffer {
    Rc::new(RefCell::new(String::new()))
}

/// A character sink that records everything written to it and tees each
/// write out to its listeners.
#[derive(Default)]
pub struct Wiretap {
    buffer: String,
    listeners: Vec<SharedBuffer>,
    gagged: bool,
}

impl Wiretap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener that receives a copy of every subsequent write.
    pub fn join(&mut self, listener: SharedBuffer) {
        self.listeners.push(listener);
    }

    /// Detach a previously joined listener.
    pub fn leave(&mut self, listener: &SharedBuffer) {
        self.listeners.retain(|l| !Rc::ptr_eq(l, listener));
    }

    /// Stop forwarding to listeners. The buffer still accumulates.
    pub fn gag(&mut self) {
        self.gagged = true;
    }

    pub fn ungag(&mut self) {
        self.gagged = false;
    }

    pub fn write_str(&mut self, s: &str) {
        if !self.gagged {
            for listener in &self.listeners {
                listener.borrow_mut().push_str(s);
            }
        }
        self.buffer.push_str(s);
    }

    /// Everything written so far.
    pub fn value(&self) -> &str {
        &self.buffer
    }

    /// Consume the tap and yield the full buffer.
    pub fn into_value(self) -> String {
        self.buffer
    }
}

impl fmt::Write for Wiretap {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Wiretap::write_str(self, s);
        Ok(())
    }
}

/// An `io::Write` adapter over a shared string buffer, for capturing the
/// output and error sinks in tests and embeddings.
#[derive(Clone)]
pub struct SharedSink(pub SharedBuffer);

impl SharedSink {
    pub fn new() -> Self {
        SharedSink(shared_buffer())
    }

    pub fn contents(&self) -> String {
        self.0.borrow().clone()
    }
}

impl Default for SharedSink {
    fn default() -> Self {
        Self::new()
    }
}

impl io::Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().push_str(&String::from_utf8_lossy(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
