//! Macro functions and their instantiation cache.

use std::cell::RefCell;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::num::NonZeroUsize;
use std::rc::Rc;

use cascade_foundation::message::{INSTANTIATION_PARSE, MISSING_ARGUMENT, MISSING_ARGUMENTS};
use cascade_foundation::{ArgRecord, CommandError, CommandResult, Message};
use lru::LruCache;
use tracing::trace;

use super::compile::check_length;
use super::template::StringTemplate;
use super::{FunctionId, InstantiatedFunction};
use crate::build::UnboundCommand;
use crate::chain::parse_command;
use crate::source::ExecutionSource;

/// Number of argument vectors a macro function keeps instantiated.
pub const MACRO_CACHE_CAPACITY: NonZeroUsize = NonZeroUsize::MIN.saturating_add(7);

/// One line of a macro function.
pub enum MacroEntry<S: ExecutionSource> {
    /// A line without variables, parsed at compile time.
    Plain(Rc<UnboundCommand<S>>),
    /// A templated line, parsed after substitution.
    Template {
        /// The parsed template.
        template: StringTemplate,
        /// For each template variable, its index in the function's parameters.
        slots: Vec<usize>,
        /// Source line number (1-indexed).
        line: usize,
    },
}

impl<S: ExecutionSource> fmt::Debug for MacroEntry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(command) => f.debug_tuple("Plain").field(command).finish(),
            Self::Template { template, line, .. } => f
                .debug_struct("Template")
                .field("template", &template.to_string())
                .field("line", line)
                .finish(),
        }
    }
}

type InstanceCache<S> = LruCache<Vec<String>, Rc<InstantiatedFunction<S>>>;

/// A function with templated lines, instantiated per argument vector.
pub struct MacroFunction<S: ExecutionSource> {
    id: FunctionId,
    entries: Vec<MacroEntry<S>>,
    parameters: Vec<String>,
    source: S,
    cache: RefCell<InstanceCache<S>>,
}

impl<S: ExecutionSource> MacroFunction<S> {
    /// Creates a macro function.
    ///
    /// `source` resolves substituted lines at instantiation time.
    #[must_use]
    pub fn new(id: FunctionId, entries: Vec<MacroEntry<S>>, parameters: Vec<String>, source: S) -> Self {
        Self {
            id,
            entries,
            parameters,
            source,
            cache: RefCell::new(LruCache::new(MACRO_CACHE_CAPACITY)),
        }
    }

    /// Returns the id.
    #[must_use]
    pub fn id(&self) -> &FunctionId {
        &self.id
    }

    /// Returns the parameter names, in first-seen order.
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Returns the lines.
    #[must_use]
    pub fn entries(&self) -> &[MacroEntry<S>] {
        &self.entries
    }

    /// Returns the number of cached instantiations.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Returns true if `arguments` is cached. Does not affect recency.
    #[must_use]
    pub fn is_cached(&self, arguments: &[String]) -> bool {
        self.cache.borrow().contains(arguments)
    }

    /// Produces the body for `arguments`.
    ///
    /// Every parameter is looked up and stringified; the resulting vector is
    /// the cache key. A hit returns the cached body and marks it most recent.
    ///
    /// # Errors
    ///
    /// Returns a command error if `arguments` is absent, lacks a parameter, or
    /// a substituted line fails to parse.
    pub fn instantiate(&self, arguments: Option<&ArgRecord>) -> CommandResult<Rc<InstantiatedFunction<S>>> {
        let Some(arguments) = arguments else {
            return Err(CommandError::new(Message::translatable(
                MISSING_ARGUMENTS,
                vec![self.id.to_string()],
            )));
        };

        let mut values = Vec::with_capacity(self.parameters.len());
        for name in &self.parameters {
            let value = arguments.get(name).ok_or_else(|| {
                CommandError::new(Message::translatable(
                    MISSING_ARGUMENT,
                    vec![self.id.to_string(), name.clone()],
                ))
            })?;
            values.push(value.to_macro_string());
        }

        if let Some(function) = self.cache.borrow_mut().get(&values) {
            trace!(id = %self.id, "macro cache hit");
            return Ok(Rc::clone(function));
        }

        let function = Rc::new(self.substitute_and_parse(&values)?);
        trace!(id = %self.id, instance = %function.id(), "macro instantiated");
        self.cache.borrow_mut().put(values, Rc::clone(&function));
        Ok(function)
    }

    fn substitute_and_parse(&self, values: &[String]) -> CommandResult<InstantiatedFunction<S>> {
        let mut hasher = DefaultHasher::new();
        values.hash(&mut hasher);
        let id = FunctionId::new(format!("{}/{}", self.id, hasher.finish()));

        let dispatcher = self.source.dispatcher();
        let mut commands = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            match entry {
                MacroEntry::Plain(command) => commands.push(Rc::clone(command)),
                MacroEntry::Template { template, slots, .. } => {
                    let arguments: Vec<&str> = slots.iter().map(|&slot| values[slot].as_str()).collect();
                    let text = template.substitute(&arguments);
                    let parse_error = |reason: String| {
                        CommandError::new(Message::translatable(
                            INSTANTIATION_PARSE,
                            vec![id.to_string(), text.clone(), reason],
                        ))
                    };
                    check_length(&text).map_err(|err| parse_error(err.to_string()))?;
                    let parsed = parse_command(dispatcher.as_ref(), &self.source, &text)
                        .map_err(|err| parse_error(err.to_string()))?;
                    commands.push(Rc::new(UnboundCommand::new(parsed.chain().clone())));
                }
            }
        }
        Ok(InstantiatedFunction::new(id, commands))
    }
}

impl<S: ExecutionSource> fmt::Debug for MacroFunction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacroFunction")
            .field("id", &self.id)
            .field("parameters", &self.parameters)
            .field("entries", &self.entries)
            .field("cached", &self.cache_len())
            .finish()
    }
}
