//! Function calls and isolated calls: the two ways to open a new frame.

use std::rc::Rc;

use cascade_foundation::Result;

use crate::action::{EntryAction, QueueEntry, UnboundEntryAction, bind};
use crate::callback::ResultCallback;
use crate::context::{ExecutionContext, ExecutionControl};
use crate::continuation::schedule;
use crate::frame::{Frame, FrameControl};
use crate::function::InstantiatedFunction;
use crate::source::ExecutionSource;

/// Calls a compiled function body in a new frame one level deeper.
pub struct CallFunction<S: ExecutionSource> {
    function: Rc<InstantiatedFunction<S>>,
    result_callback: ResultCallback,
    return_parent_frame: bool,
}

impl<S: ExecutionSource> CallFunction<S> {
    /// Creates a call.
    ///
    /// With `return_parent_frame` the new frame shares the caller's governor,
    /// so a return inside the callee also ends the caller. Otherwise the callee
    /// gets a governor of its own.
    #[must_use]
    pub fn new(
        function: Rc<InstantiatedFunction<S>>,
        result_callback: ResultCallback,
        return_parent_frame: bool,
    ) -> Self {
        Self {
            function,
            result_callback,
            return_parent_frame,
        }
    }
}

impl<S: ExecutionSource> UnboundEntryAction<S> for CallFunction<S> {
    fn execute(&self, source: &S, context: &mut ExecutionContext<S>, frame: &Frame) -> Result<()> {
        context.increment_cost()?;

        let entries = Rc::clone(self.function.entries());
        if let Some(tracer) = context.tracer() {
            tracer.on_call(frame.depth(), self.function.id().as_str(), entries.len());
        }

        let depth = frame.depth() + 1;
        let control = if self.return_parent_frame {
            Rc::clone(frame.control())
        } else {
            FrameControl::new(depth)
        };
        let callee = Frame::new(depth, self.result_callback.clone(), control);

        let source = source.clone();
        schedule(context, &callee, entries, move |frame, entry| {
            let action = Rc::clone(entry) as Rc<dyn UnboundEntryAction<S>>;
            QueueEntry::new(frame.clone(), bind(action, source.clone()))
        });
        Ok(())
    }
}

/// Work run inside an isolated frame.
pub type IsolatedTask<S> = Box<dyn FnOnce(&mut ExecutionControl<'_, S>) -> Result<()>>;

/// Opens a fresh frame below the carrier frame and hands it to a task.
pub struct IsolatedCall<S: ExecutionSource> {
    task: IsolatedTask<S>,
    output: ResultCallback,
}

impl<S: ExecutionSource> IsolatedCall<S> {
    /// Creates an isolated call whose frame reports to `output`.
    #[must_use]
    pub fn new(task: IsolatedTask<S>, output: ResultCallback) -> Self {
        Self { task, output }
    }
}

impl<S: ExecutionSource> EntryAction<S> for IsolatedCall<S> {
    fn execute(self: Box<Self>, context: &mut ExecutionContext<S>, frame: &Frame) -> Result<()> {
        let depth = frame.depth() + 1;
        let isolated = Frame::new(depth, self.output, FrameControl::new(depth));
        let mut handle = ExecutionControl::new(context, isolated);
        (self.task)(&mut handle)
    }
}
