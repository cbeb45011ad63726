//! The chain builder.
//!
//! Walks a command's stages, applies redirects to the live sources, and then
//! either hands the terminal stage to a custom executor or fans terminal
//! execution out through the continuation scheduler.

use std::fmt;
use std::rc::Rc;

use cascade_foundation::{CommandError, Error, Result};

use crate::action::{EntryAction, FallthroughTask, QueueEntry, UnboundEntryAction, bind};
use crate::callback::ResultCallback;
use crate::chain::{ChainModifiers, CommandChain, Executable, Redirect};
use crate::context::{ExecutionContext, ExecutionControl};
use crate::continuation::schedule;
use crate::execute::ExecuteCommand;
use crate::frame::Frame;
use crate::source::ExecutionSource;

/// Walks `chain` for `sources` on behalf of `original`.
fn execute_command_chain<S: ExecutionSource>(
    chain: &CommandChain<S>,
    original: &S,
    sources: Vec<S>,
    context: &mut ExecutionContext<S>,
    frame: &Frame,
    modifiers: ChainModifiers,
) -> Result<()> {
    let input = Rc::clone(chain.input());
    context.profiler().push(&|| format!("prepare {input}"));
    let result = walk(chain.clone(), original, sources, context, frame, modifiers);
    context.profiler().pop();
    result
}

fn walk<S: ExecutionSource>(
    mut chain: CommandChain<S>,
    original: &S,
    mut sources: Vec<S>,
    context: &mut ExecutionContext<S>,
    frame: &Frame,
    mut modifiers: ChainModifiers,
) -> Result<()> {
    let fork_limit = context.fork_limit();

    while !chain.is_terminal() {
        let stage = chain.top();
        if stage.forks() {
            modifiers = modifiers.set_forked();
        }

        match stage.redirect() {
            Some(Redirect::Custom(executor)) => {
                let executor = Rc::clone(executor);
                let mut control = ExecutionControl::new(context, frame.clone());
                return executor.apply(original, &sources, &chain, modifiers, &mut control);
            }
            Some(Redirect::Modifier(modifier)) => {
                let modifier = Rc::clone(modifier);
                context.increment_cost()?;

                let mut next = Vec::new();
                for source in &sources {
                    match modifier(source) {
                        Ok(produced) => {
                            if next.len() + produced.len() > fork_limit {
                                original.handle_error(
                                    &CommandError::fork_limit(fork_limit),
                                    false,
                                    context.tracer(),
                                );
                                return Ok(());
                            }
                            next.extend(produced);
                        }
                        Err(err) => {
                            source.handle_error(&err, modifiers.is_forked(), context.tracer());
                            if !modifiers.is_forked() {
                                return Ok(());
                            }
                        }
                    }
                }
                sources = next;
            }
            None => {
                return Err(Error::internal(format!(
                    "stage '{}' neither redirects nor runs",
                    stage.input()
                )));
            }
        }

        chain = chain.next_stage();
        if sources.is_empty() {
            break;
        }
    }

    if sources.is_empty() {
        if modifiers.is_return() {
            context.queue_next(QueueEntry::new(frame.clone(), Box::new(FallthroughTask)));
        }
        return Ok(());
    }

    match chain.top().executable() {
        Some(Executable::Custom(executor)) => {
            let executor = Rc::clone(executor);
            for source in &sources {
                let mut control = ExecutionControl::new(context, frame.clone());
                executor.run(source, &chain, modifiers, &mut control)?;
            }
            Ok(())
        }
        Some(Executable::Command(command)) => {
            if modifiers.is_return() {
                // Only one source can end the frame; the first one wins.
                sources.truncate(1);
                let callback = ResultCallback::chain(&sources[0].callback(), frame.return_callback());
                let first = sources[0].with_callback(callback);
                sources[0] = first;
            }
            let execute: Rc<dyn UnboundEntryAction<S>> = Rc::new(ExecuteCommand::new(
                Rc::clone(chain.input()),
                Rc::clone(command),
                modifiers,
            ));
            schedule(context, frame, sources.into(), move |frame, source: &S| {
                QueueEntry::new(frame.clone(), bind(Rc::clone(&execute), source.clone()))
            });
            Ok(())
        }
        None => Err(Error::internal(format!(
            "terminal stage of '{}' has nothing to run",
            chain.input()
        ))),
    }
}

/// A compiled command awaiting a source: one entry of a function body.
pub struct UnboundCommand<S: ExecutionSource> {
    chain: CommandChain<S>,
}

impl<S: ExecutionSource> UnboundCommand<S> {
    /// Wraps a flattened chain.
    #[must_use]
    pub fn new(chain: CommandChain<S>) -> Self {
        Self { chain }
    }

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

impl<S: ExecutionSource> UnboundEntryAction<S> for UnboundCommand<S> {
    fn execute(&self, source: &S, context: &mut ExecutionContext<S>, frame: &Frame) -> Result<()> {
        execute_command_chain(
            &self.chain,
            source,
            vec![source.clone()],
            context,
            frame,
            ChainModifiers::DEFAULT,
        )
    }
}

impl<S: ExecutionSource> PartialEq for UnboundCommand<S> {
    fn eq(&self, other: &Self) -> bool {
        self.chain == other.chain
    }
}

impl<S: ExecutionSource> fmt::Debug for UnboundCommand<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UnboundCommand").field(&self.chain.input()).finish()
    }
}

/// A top-level command bound to the source that submitted it.
pub struct TopLevelCommand<S: ExecutionSource> {
    chain: CommandChain<S>,
    source: S,
}

impl<S: ExecutionSource> TopLevelCommand<S> {
    /// Binds `chain` to `source`.
    #[must_use]
    pub fn new(chain: CommandChain<S>, source: S) -> Self {
        Self { chain, source }
    }
}

impl<S: ExecutionSource> EntryAction<S> for TopLevelCommand<S> {
    fn execute(self: Box<Self>, context: &mut ExecutionContext<S>, frame: &Frame) -> Result<()> {
        let sources = vec![self.source.clone()];
        execute_command_chain(
            &self.chain,
            &self.source,
            sources,
            context,
            frame,
            ChainModifiers::DEFAULT,
        )
    }
}

/// The rest of a chain, resumed with already-computed sources.
///
/// Queued by custom redirects that want the remaining stages to run later,
/// typically with upgraded modifiers.
pub struct ContinuationCommand<S: ExecutionSource> {
    chain: CommandChain<S>,
    original: S,
    sources: Vec<S>,
    modifiers: ChainModifiers,
}

impl<S: ExecutionSource> ContinuationCommand<S> {
    /// Resumes `chain` for `sources`.
    #[must_use]
    pub fn new(chain: CommandChain<S>, original: S, sources: Vec<S>, modifiers: ChainModifiers) -> Self {
        Self {
            chain,
            original,
            sources,
            modifiers,
        }
    }
}

impl<S: ExecutionSource> EntryAction<S> for ContinuationCommand<S> {
    fn execute(self: Box<Self>, context: &mut ExecutionContext<S>, frame: &Frame) -> Result<()> {
        let Self {
            chain,
            original,
            sources,
            modifiers,
        } = *self;
        execute_command_chain(&chain, &original, sources, context, frame, modifiers)
    }
}
