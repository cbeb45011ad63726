//! The world commands run against.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use cascade_engine::{CommandDispatcher, CommandFunction};

use crate::commands::StandardDispatcher;
use crate::library::FunctionLibrary;
use crate::source::ScriptSource;

/// One line of output produced by a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputLine {
    /// Something a command said.
    Message {
        /// Name of the speaking source.
        source: String,
        /// The text.
        text: String,
    },
    /// A failure reported to a source.
    Failure {
        /// Name of the failing source.
        source: String,
        /// The rendered error.
        text: String,
    },
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message { source, text } => write!(f, "[{source}] {text}"),
            Self::Failure { source, text } => write!(f, "[{source}] error: {text}"),
        }
    }
}

/// Owns the dispatcher, the function library, named counters, and output.
pub struct Host {
    dispatcher: Rc<dyn CommandDispatcher<ScriptSource>>,
    library: RefCell<FunctionLibrary>,
    counters: RefCell<HashMap<String, i32>>,
    output: RefCell<Vec<OutputLine>>,
}

impl Host {
    /// Creates a host with the standard command set.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            dispatcher: Rc::new(StandardDispatcher),
            library: RefCell::new(FunctionLibrary::new()),
            counters: RefCell::new(HashMap::new()),
            output: RefCell::new(Vec::new()),
        })
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> Rc<dyn CommandDispatcher<ScriptSource>> {
        Rc::clone(&self.dispatcher)
    }

    /// A console source with full permissions.
    #[must_use]
    pub fn console(self: &Rc<Self>) -> ScriptSource {
        ScriptSource::new(Rc::clone(self), "console", 4)
    }

    /// The source functions are compiled and instantiated with.
    #[must_use]
    pub fn compiler(self: &Rc<Self>) -> ScriptSource {
        ScriptSource::new(Rc::clone(self), "function", 2)
    }

    /// Returns the function library.
    #[must_use]
    pub fn library(&self) -> Ref<'_, FunctionLibrary> {
        self.library.borrow()
    }

    /// Returns the function library for modification.
    #[must_use]
    pub fn library_mut(&self) -> RefMut<'_, FunctionLibrary> {
        self.library.borrow_mut()
    }

    /// Looks up a function by id.
    #[must_use]
    pub fn function(&self, id: &str) -> Option<Rc<CommandFunction<ScriptSource>>> {
        self.library.borrow().get(id)
    }

    /// Returns a counter's value. Missing counters read as zero.
    #[must_use]
    pub fn counter(&self, name: &str) -> i32 {
        self.counters.borrow().get(name).copied().unwrap_or(0)
    }

    /// Adds `delta` to a counter, saturating, and returns the new value.
    pub fn add_counter(&self, name: &str, delta: i32) -> i32 {
        let mut counters = self.counters.borrow_mut();
        let value = counters.entry(name.to_string()).or_insert(0);
        *value = value.saturating_add(delta);
        *value
    }

    /// Sets a counter.
    pub fn set_counter(&self, name: &str, value: i32) {
        self.counters.borrow_mut().insert(name.to_string(), value);
    }

    /// Appends an output line.
    pub fn emit(&self, line: OutputLine) {
        self.output.borrow_mut().push(line);
    }

    /// Returns a copy of the output so far.
    #[must_use]
    pub fn output(&self) -> Vec<OutputLine> {
        self.output.borrow().clone()
    }

    /// Removes and returns the output so far.
    pub fn take_output(&self) -> Vec<OutputLine> {
        std::mem::take(&mut *self.output.borrow_mut())
    }

    /// Returns only the rendered message lines.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.output
            .borrow()
            .iter()
            .filter(|line| matches!(line, OutputLine::Message { .. }))
            .map(ToString::to_string)
            .collect()
    }

    /// Returns only the rendered failure lines.
    #[must_use]
    pub fn failures(&self) -> Vec<String> {
        self.output
            .borrow()
            .iter()
            .filter(|line| matches!(line, OutputLine::Failure { .. }))
            .map(ToString::to_string)
            .collect()
    }

    /// Drops every function.
    ///
    /// Macro functions hold a source, and sources hold the host, so a host
    /// with loaded macros is only freed once its library is cleared.
    pub fn clear_functions(&self) {
        self.library.borrow_mut().clear();
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("functions", &self.library.borrow().len())
            .field("counters", &self.counters.borrow())
            .field("output", &self.output.borrow().len())
            .finish_non_exhaustive()
    }
}
