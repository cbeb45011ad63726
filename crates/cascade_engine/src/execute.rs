//! Terminal execution of one resolved command for one source.

use std::rc::Rc;

use cascade_foundation::Result;

use crate::action::UnboundEntryAction;
use crate::chain::{ChainModifiers, CommandFn};
use crate::context::ExecutionContext;
use crate::frame::Frame;
use crate::source::ExecutionSource;

/// Runs a terminal command and reports its result through the source callback.
pub struct ExecuteCommand<S: ExecutionSource> {
    input: Rc<str>,
    command: Rc<CommandFn<S>>,
    modifiers: ChainModifiers,
}

impl<S: ExecutionSource> ExecuteCommand<S> {
    /// Creates the action for the command text `input`.
    #[must_use]
    pub fn new(input: Rc<str>, command: Rc<CommandFn<S>>, modifiers: ChainModifiers) -> Self {
        Self {
            input,
            command,
            modifiers,
        }
    }

    fn run(&self, source: &S, context: &mut ExecutionContext<S>, frame: &Frame) -> Result<()> {
        context.increment_cost()?;
        if let Some(tracer) = context.tracer() {
            tracer.on_command(frame.depth(), &self.input);
        }

        match (self.command)(source) {
            Ok(result) => {
                source.callback().on_success(result);
                if let Some(tracer) = context.tracer() {
                    tracer.on_return(frame.depth(), &self.input, result);
                }
            }
            Err(err) => {
                source.callback().on_failure();
                source.handle_error(&err, self.modifiers.is_forked(), context.tracer());
            }
        }
        Ok(())
    }
}

impl<S: ExecutionSource> UnboundEntryAction<S> for ExecuteCommand<S> {
    fn execute(&self, source: &S, context: &mut ExecutionContext<S>, frame: &Frame) -> Result<()> {
        let input = Rc::clone(&self.input);
        context.profiler().push(&|| format!("execute {input}"));
        let result = self.run(source, context, frame);
        context.profiler().pop();
        result
    }
}
