//! Compiled functions.
//!
//! A function file compiles once into a [`CommandFunction`]: either a fixed
//! list of parsed commands, or a macro function whose templated lines are
//! filled in per call. Either way a call runs an [`InstantiatedFunction`].

mod compile;
mod macros;
mod template;

use std::fmt;
use std::rc::Rc;

use cascade_foundation::{ArgRecord, CommandResult, Result};

use crate::build::UnboundCommand;
use crate::source::ExecutionSource;

pub use compile::MAX_COMMAND_LENGTH;
pub use macros::{MACRO_CACHE_CAPACITY, MacroEntry, MacroFunction};
pub use template::{StringTemplate, TemplateError};

/// The stable name of a function, such as `demo:greet`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(Rc<str>);

impl FunctionId {
    /// Creates an id.
    #[must_use]
    pub fn new(id: impl Into<Rc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the id as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionId({})", self.0)
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FunctionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for FunctionId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// A function body ready to be called: a fixed list of parsed commands.
pub struct InstantiatedFunction<S: ExecutionSource> {
    id: FunctionId,
    entries: Rc<[Rc<UnboundCommand<S>>]>,
}

impl<S: ExecutionSource> InstantiatedFunction<S> {
    /// Creates a function from its parsed entries.
    #[must_use]
    pub fn new(id: FunctionId, entries: Vec<Rc<UnboundCommand<S>>>) -> Self {
        Self {
            id,
            entries: entries.into(),
        }
    }

    /// Returns the id.
    #[must_use]
    pub fn id(&self) -> &FunctionId {
        &self.id
    }

    /// Returns the entries, in order.
    #[must_use]
    pub fn entries(&self) -> &Rc<[Rc<UnboundCommand<S>>]> {
        &self.entries
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the body is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: ExecutionSource> PartialEq for InstantiatedFunction<S> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|(a, b)| a == b)
    }
}

impl<S: ExecutionSource> fmt::Debug for InstantiatedFunction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstantiatedFunction")
            .field("id", &self.id)
            .field("entries", &self.entries)
            .finish()
    }
}

/// A compiled function file.
pub enum CommandFunction<S: ExecutionSource> {
    /// No macro lines: the body is fixed.
    Plain(Rc<InstantiatedFunction<S>>),
    /// At least one macro line: the body is built per argument vector.
    Macro(MacroFunction<S>),
}

impl<S: ExecutionSource> CommandFunction<S> {
    /// Compiles function source lines.
    ///
    /// Commands are resolved with `source`'s dispatcher, as `source`. Macro
    /// lines keep `source` for resolving their substituted text later.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed lines: a dangling continuation, a
    /// leading slash, an over-long command, an invalid macro line, or a
    /// command that fails to parse.
    pub fn from_lines<L: AsRef<str>>(id: impl Into<FunctionId>, source: &S, lines: &[L]) -> Result<Self> {
        compile::compile(id.into(), source, lines)
    }

    /// Returns the id.
    #[must_use]
    pub fn id(&self) -> &FunctionId {
        match self {
            Self::Plain(function) => function.id(),
            Self::Macro(function) => function.id(),
        }
    }

    /// Returns true for macro functions.
    #[must_use]
    pub fn is_macro(&self) -> bool {
        matches!(self, Self::Macro(_))
    }

    /// Returns the declared macro parameters, in first-seen order.
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        match self {
            Self::Plain(_) => &[],
            Self::Macro(function) => function.parameters(),
        }
    }

    /// Produces the body to call.
    ///
    /// Plain functions ignore `arguments`.
    ///
    /// # Errors
    ///
    /// Returns a command error if a macro function lacks arguments or a
    /// substituted line fails to parse.
    pub fn instantiate(&self, arguments: Option<&ArgRecord>) -> CommandResult<Rc<InstantiatedFunction<S>>> {
        match self {
            Self::Plain(function) => Ok(Rc::clone(function)),
            Self::Macro(function) => function.instantiate(arguments),
        }
    }
}

impl<S: ExecutionSource> fmt::Debug for CommandFunction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(function) => f.debug_tuple("Plain").field(function).finish(),
            Self::Macro(function) => f.debug_tuple("Macro").field(function).finish(),
        }
    }
}
