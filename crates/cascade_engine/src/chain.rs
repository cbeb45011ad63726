//! Resolved command chains and the parser boundary.
//!
//! A dispatcher resolves one line of text into a list of [`Stage`]s. Every
//! stage but the last redirects its sources to the next; the last stage runs.
//! [`CommandChain::try_flatten`] checks that shape once, so the chain builder
//! can walk it without re-validating.

use std::fmt;
use std::rc::Rc;

use cascade_foundation::{CommandError, CommandResult, Result};

use crate::context::ExecutionControl;
use crate::source::ExecutionSource;

/// A redirect closure: maps one source to the sources of the next stage.
pub type ModifierFn<S> = dyn Fn(&S) -> CommandResult<Vec<S>>;

/// A terminal command closure: runs against one source and yields a result.
pub type CommandFn<S> = dyn Fn(&S) -> CommandResult<i32>;

/// A redirect that takes over the rest of the chain.
pub trait CustomModifierExecutor<S: ExecutionSource> {
    /// Handles the remaining chain for `sources`.
    ///
    /// `original` is the source that issued the command, before any forking.
    ///
    /// # Errors
    ///
    /// Returns an error only for conditions that abort the whole run.
    fn apply(
        &self,
        original: &S,
        sources: &[S],
        chain: &CommandChain<S>,
        modifiers: ChainModifiers,
        control: &mut ExecutionControl<'_, S>,
    ) -> Result<()>;
}

/// A terminal command that schedules its own work instead of returning a value.
pub trait CustomCommandExecutor<S: ExecutionSource> {
    /// Runs the command for one source.
    ///
    /// # Errors
    ///
    /// Returns an error only for conditions that abort the whole run.
    fn run(
        &self,
        source: &S,
        chain: &CommandChain<S>,
        modifiers: ChainModifiers,
        control: &mut ExecutionControl<'_, S>,
    ) -> Result<()>;
}

/// How a non-terminal stage produces the sources of the next stage.
pub enum Redirect<S: ExecutionSource> {
    /// Applied once per live source; results are unioned.
    Modifier(Rc<ModifierFn<S>>),
    /// Hands off the rest of the chain.
    Custom(Rc<dyn CustomModifierExecutor<S>>),
}

impl<S: ExecutionSource> Clone for Redirect<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Modifier(f) => Self::Modifier(Rc::clone(f)),
            Self::Custom(e) => Self::Custom(Rc::clone(e)),
        }
    }
}

/// What the terminal stage does.
pub enum Executable<S: ExecutionSource> {
    /// Runs and reports a numeric result.
    Command(Rc<CommandFn<S>>),
    /// Schedules work through an execution-control handle.
    Custom(Rc<dyn CustomCommandExecutor<S>>),
}

impl<S: ExecutionSource> Clone for Executable<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Command(f) => Self::Command(Rc::clone(f)),
            Self::Custom(e) => Self::Custom(Rc::clone(e)),
        }
    }
}

/// One resolved step of a command.
pub struct Stage<S: ExecutionSource> {
    input: Rc<str>,
    redirect: Option<Redirect<S>>,
    forks: bool,
    executable: Option<Executable<S>>,
}

impl<S: ExecutionSource> Clone for Stage<S> {
    fn clone(&self) -> Self {
        Self {
            input: Rc::clone(&self.input),
            redirect: self.redirect.clone(),
            forks: self.forks,
            executable: self.executable.clone(),
        }
    }
}

impl<S: ExecutionSource> Stage<S> {
    /// Creates a stage covering `input` that neither redirects nor runs.
    #[must_use]
    pub fn new(input: impl Into<Rc<str>>) -> Self {
        Self {
            input: input.into(),
            redirect: None,
            forks: false,
            executable: None,
        }
    }

    /// Builder method to redirect through a closure.
    #[must_use]
    pub fn with_modifier(mut self, modifier: impl Fn(&S) -> CommandResult<Vec<S>> + 'static) -> Self {
        self.redirect = Some(Redirect::Modifier(Rc::new(modifier)));
        self
    }

    /// Builder method to hand the rest of the chain to a custom executor.
    #[must_use]
    pub fn with_custom_modifier(mut self, executor: Rc<dyn CustomModifierExecutor<S>>) -> Self {
        self.redirect = Some(Redirect::Custom(executor));
        self
    }

    /// Builder method to mark the stage as forking.
    #[must_use]
    pub fn forking(mut self) -> Self {
        self.forks = true;
        self
    }

    /// Builder method to make the stage terminal with a closure.
    #[must_use]
    pub fn with_command(mut self, command: impl Fn(&S) -> CommandResult<i32> + 'static) -> Self {
        self.executable = Some(Executable::Command(Rc::new(command)));
        self
    }

    /// Builder method to make the stage terminal with a custom executor.
    #[must_use]
    pub fn with_custom_command(mut self, executor: Rc<dyn CustomCommandExecutor<S>>) -> Self {
        self.executable = Some(Executable::Custom(executor));
        self
    }

    /// Returns the text this stage was resolved from.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns the redirect, if any.
    #[must_use]
    pub fn redirect(&self) -> Option<&Redirect<S>> {
        self.redirect.as_ref()
    }

    /// Returns true if this stage forks.
    #[must_use]
    pub fn forks(&self) -> bool {
        self.forks
    }

    /// Returns the terminal action, if any.
    #[must_use]
    pub fn executable(&self) -> Option<&Executable<S>> {
        self.executable.as_ref()
    }

    /// Compares input and structure. Closures are not comparable.
    fn same_shape(&self, other: &Self) -> bool {
        let redirect_kind = |r: Option<&Redirect<S>>| match r {
            None => 0,
            Some(Redirect::Modifier(_)) => 1,
            Some(Redirect::Custom(_)) => 2,
        };
        let executable_kind = |e: Option<&Executable<S>>| match e {
            None => 0,
            Some(Executable::Command(_)) => 1,
            Some(Executable::Custom(_)) => 2,
        };
        self.input == other.input
            && self.forks == other.forks
            && redirect_kind(self.redirect()) == redirect_kind(other.redirect())
            && executable_kind(self.executable()) == executable_kind(other.executable())
    }
}

impl<S: ExecutionSource> fmt::Debug for Stage<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("input", &self.input)
            .field("redirects", &self.redirect.is_some())
            .field("forks", &self.forks)
            .field("executable", &self.executable.is_some())
            .finish()
    }
}

/// A linear, validated chain of stages positioned at one of them.
pub struct CommandChain<S: ExecutionSource> {
    input: Rc<str>,
    stages: Rc<[Stage<S>]>,
    index: usize,
}

impl<S: ExecutionSource> Clone for CommandChain<S> {
    fn clone(&self) -> Self {
        Self {
            input: Rc::clone(&self.input),
            stages: Rc::clone(&self.stages),
            index: self.index,
        }
    }
}

impl<S: ExecutionSource> CommandChain<S> {
    /// Flattens resolved stages into a chain.
    ///
    /// Returns `None` if there are no stages, if the last stage does not run
    /// anything, or if an earlier stage does not redirect.
    #[must_use]
    pub fn try_flatten(input: impl Into<Rc<str>>, stages: Vec<Stage<S>>) -> Option<Self> {
        let (last, rest) = stages.split_last()?;
        if last.executable.is_none() || rest.iter().any(|stage| stage.redirect.is_none()) {
            return None;
        }
        Some(Self {
            input: input.into(),
            stages: stages.into(),
            index: 0,
        })
    }

    /// Returns the full command text.
    #[must_use]
    pub fn input(&self) -> &Rc<str> {
        &self.input
    }

    /// Returns the stage the chain is positioned at.
    #[must_use]
    pub fn top(&self) -> &Stage<S> {
        &self.stages[self.index]
    }

    /// Returns true if the chain is positioned at its last stage.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.index + 1 == self.stages.len()
    }

    /// Returns the chain positioned one stage further.
    ///
    /// A terminal chain stays where it is.
    #[must_use]
    pub fn next_stage(&self) -> Self {
        Self {
            input: Rc::clone(&self.input),
            stages: Rc::clone(&self.stages),
            index: (self.index + 1).min(self.stages.len() - 1),
        }
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false: flattened chains have at least one stage.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl<S: ExecutionSource> PartialEq for CommandChain<S> {
    fn eq(&self, other: &Self) -> bool {
        self.input == other.input
            && self.index == other.index
            && self.stages.len() == other.stages.len()
            && self
                .stages
                .iter()
                .zip(other.stages.iter())
                .all(|(a, b)| a.same_shape(b))
    }
}

impl<S: ExecutionSource> fmt::Debug for CommandChain<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandChain")
            .field("input", &self.input)
            .field("index", &self.index)
            .field("stages", &self.stages)
            .finish()
    }
}

/// Upgrades applied while a chain is walked.
///
/// Both flags only ever go from false to true.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChainModifiers {
    forked: bool,
    return_requested: bool,
}

impl ChainModifiers {
    /// No upgrades.
    pub const DEFAULT: Self = Self {
        forked: false,
        return_requested: false,
    };

    /// Returns these modifiers with the forked flag set.
    #[must_use]
    pub fn set_forked(self) -> Self {
        Self {
            forked: true,
            ..self
        }
    }

    /// Returns these modifiers with the return flag set.
    #[must_use]
    pub fn set_return(self) -> Self {
        Self {
            return_requested: true,
            ..self
        }
    }

    /// Returns true once any stage has forked.
    #[must_use]
    pub fn is_forked(self) -> bool {
        self.forked
    }

    /// Returns true if the result should end the enclosing frame.
    #[must_use]
    pub fn is_return(self) -> bool {
        self.return_requested
    }
}

/// Resolves command text into stages for a given source.
pub trait CommandDispatcher<S: ExecutionSource> {
    /// Resolves one sigil-stripped line.
    ///
    /// # Errors
    ///
    /// Returns a command error if the text is not a valid command for `source`.
    fn resolve(&self, input: &str, source: &S) -> CommandResult<Vec<Stage<S>>>;
}

/// A command resolved and flattened ahead of execution.
pub struct ParsedCommand<S: ExecutionSource> {
    chain: CommandChain<S>,
}

impl<S: ExecutionSource> Clone for ParsedCommand<S> {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
        }
    }
}

impl<S: ExecutionSource> ParsedCommand<S> {
    /// Returns the command text.
    #[must_use]
    pub fn input(&self) -> &str {
        self.chain.input()
    }

    /// Returns the flattened chain.
    #[must_use]
    pub fn chain(&self) -> &CommandChain<S> {
        &self.chain
    }
}

impl<S: ExecutionSource> fmt::Debug for ParsedCommand<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ParsedCommand").field(&self.chain).finish()
    }
}

/// Resolves and flattens `input` against `dispatcher` for `source`.
///
/// # Errors
///
/// Returns the dispatcher's error, or an "unknown command" error if the
/// resolved stages cannot be flattened.
pub fn parse_command<S: ExecutionSource>(
    dispatcher: &dyn CommandDispatcher<S>,
    source: &S,
    input: &str,
) -> CommandResult<ParsedCommand<S>> {
    let stages = dispatcher.resolve(input, source)?;
    let chain =
        CommandChain::try_flatten(input, stages).ok_or_else(|| CommandError::unknown_command(input))?;
    Ok(ParsedCommand { chain })
}
