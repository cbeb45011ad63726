//! Diagnostic hooks: tracing callbacks and a section profiler.
//!
//! Both hooks are optional. A context without a tracer skips trace calls
//! entirely, and the default profiler does nothing.

use std::cell::RefCell;
use std::rc::Rc;

/// Receives execution events from a running context.
pub trait TraceCallbacks {
    /// A command is about to run at `depth`.
    fn on_command(&mut self, depth: usize, command: &str);

    /// A command returned `result` at `depth`.
    fn on_return(&mut self, depth: usize, command: &str, result: i32);

    /// A function with `size` entries was called from `depth`.
    fn on_call(&mut self, depth: usize, function: &str, size: usize);

    /// A command reported an error.
    fn on_error(&mut self, message: &str);
}

impl<T: TraceCallbacks> TraceCallbacks for Rc<RefCell<T>> {
    fn on_command(&mut self, depth: usize, command: &str) {
        self.borrow_mut().on_command(depth, command);
    }

    fn on_return(&mut self, depth: usize, command: &str, result: i32) {
        self.borrow_mut().on_return(depth, command, result);
    }

    fn on_call(&mut self, depth: usize, function: &str, size: usize) {
        self.borrow_mut().on_call(depth, function, size);
    }

    fn on_error(&mut self, message: &str) {
        self.borrow_mut().on_error(message);
    }
}

/// Measures nested, named sections of work.
pub trait Profiler {
    /// Enters a section. The name is produced lazily.
    fn push(&mut self, section: &dyn Fn() -> String);

    /// Leaves the innermost section.
    fn pop(&mut self);
}

/// A profiler that records nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopProfiler;

impl Profiler for NoopProfiler {
    #[inline]
    fn push(&mut self, _section: &dyn Fn() -> String) {}

    #[inline]
    fn pop(&mut self) {}
}

impl<P: Profiler> Profiler for Rc<RefCell<P>> {
    fn push(&mut self, section: &dyn Fn() -> String) {
        self.borrow_mut().push(section);
    }

    fn pop(&mut self) {
        self.borrow_mut().pop();
    }
}
