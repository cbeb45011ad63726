//! The execution context: run queue, cost budget, and frame governors.
//!
//! One context drives one run. Callers queue root work with the `queue_*`
//! entry points and then call [`ExecutionContext::run`], which pops entries
//! until the queue is empty or a limit aborts the run. Nothing here recurses:
//! every nested step is another queue entry.
//!
//! Entries queued while one entry executes are staged, then spliced onto the
//! front of the queue in submission order once that entry returns. Siblings
//! keep FIFO order among themselves, and a called function's body finishes
//! before any work queued ahead of the call.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use cascade_foundation::{Error, Result, SemanticLimit};
use tracing::{debug, error, warn};

use crate::action::{EntryAction, QueueEntry, bind};
use crate::build::TopLevelCommand;
use crate::call::{CallFunction, IsolatedCall, IsolatedTask};
use crate::callback::ResultCallback;
use crate::chain::ParsedCommand;
use crate::config::ExecutionConfig;
use crate::diagnostics::{NoopProfiler, Profiler, TraceCallbacks};
use crate::frame::{Frame, FrameControl};
use crate::function::InstantiatedFunction;
use crate::source::ExecutionSource;

/// What a completed run did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Cost units charged.
    pub cost: usize,
    /// Deepest frame reached.
    pub max_depth: usize,
}

/// Owns the run queue and budget for one run.
pub struct ExecutionContext<S: ExecutionSource> {
    config: ExecutionConfig,
    cost: usize,
    queue: VecDeque<QueueEntry<S>>,
    staged: Vec<QueueEntry<S>>,
    frame_controls: HashMap<usize, Rc<FrameControl>>,
    queue_overflow: bool,
    current_depth: usize,
    max_depth: usize,
    tracer: Option<Box<dyn TraceCallbacks>>,
    profiler: Box<dyn Profiler>,
}

impl<S: ExecutionSource> ExecutionContext<S> {
    /// Creates a context with the given limits and no diagnostics.
    #[must_use]
    pub fn new(config: ExecutionConfig) -> Self {
        Self {
            config,
            cost: 0,
            queue: VecDeque::new(),
            staged: Vec::new(),
            frame_controls: HashMap::new(),
            queue_overflow: false,
            current_depth: 0,
            max_depth: 0,
            tracer: None,
            profiler: Box::new(NoopProfiler),
        }
    }

    /// Builder method to attach a tracer.
    #[must_use]
    pub fn with_tracer(mut self, tracer: impl TraceCallbacks + 'static) -> Self {
        self.tracer = Some(Box::new(tracer));
        self
    }

    /// Builder method to attach a profiler.
    #[must_use]
    pub fn with_profiler(mut self, profiler: impl Profiler + 'static) -> Self {
        self.profiler = Box::new(profiler);
        self
    }

    /// Returns the limits of this run.
    #[must_use]
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Returns the fork limit.
    #[must_use]
    pub fn fork_limit(&self) -> usize {
        self.config.fork_limit
    }

    /// Returns the cost charged so far.
    #[must_use]
    pub fn cost(&self) -> usize {
        self.cost
    }

    /// Returns the number of pending entries.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len() + self.staged.len()
    }

    /// Returns the tracer, if one is attached.
    pub fn tracer(&mut self) -> Option<&mut (dyn TraceCallbacks + 'static)> {
        self.tracer.as_deref_mut()
    }

    /// Returns the profiler.
    pub fn profiler(&mut self) -> &mut dyn Profiler {
        self.profiler.as_mut()
    }

    /// Queues an entry after everything queued by the current step.
    pub fn queue_next(&mut self, entry: QueueEntry<S>) {
        self.staged.push(entry);
        if self.pending() > self.config.queue_limit {
            self.queue_overflow = true;
        }
    }

    fn push_staged(&mut self) {
        for entry in self.staged.drain(..).rev() {
            self.queue.push_front(entry);
        }
    }

    /// Charges one cost unit.
    ///
    /// # Errors
    ///
    /// Returns [`SemanticLimit::CommandCost`] once the ceiling has been
    /// reached; the run is then aborted by [`ExecutionContext::run`].
    pub fn increment_cost(&mut self) -> Result<()> {
        if self.cost >= self.config.command_limit {
            return Err(Error::limit_exceeded(SemanticLimit::CommandCost {
                limit: self.config.command_limit,
            }));
        }
        self.cost += 1;
        Ok(())
    }

    /// Returns the governor for `depth`, creating it if absent.
    pub fn frame_control_for_depth(&mut self, depth: usize) -> Rc<FrameControl> {
        Rc::clone(
            self.frame_controls
                .entry(depth)
                .or_insert_with(|| FrameControl::new(depth)),
        )
    }

    /// Queues a parsed top-level command for `source`.
    ///
    /// `callback` receives the outcome of the root frame.
    pub fn queue_initial_command_execution(
        &mut self,
        command: &ParsedCommand<S>,
        source: S,
        callback: ResultCallback,
    ) {
        let frame = Frame::new(0, callback, self.frame_control_for_depth(0));
        let action = TopLevelCommand::new(command.chain().clone(), source);
        self.queue_next(QueueEntry::new(frame, Box::new(action)));
    }

    /// Queues a call of `function` for `source`.
    ///
    /// `callback` receives the function's return value.
    pub fn queue_initial_function_call(
        &mut self,
        function: Rc<InstantiatedFunction<S>>,
        source: S,
        callback: ResultCallback,
    ) {
        let frame = Frame::new(0, callback.clone(), self.frame_control_for_depth(0));
        let call = CallFunction::new(function, callback, false);
        self.queue_next(QueueEntry::new(frame, bind(Rc::new(call), source)));
    }

    /// Injects an isolated root frame one level below the current depth.
    ///
    /// `task` runs with its own execution-control handle; `output` receives
    /// whatever the isolated frame returns.
    pub fn queue_isolated(&mut self, task: IsolatedTask<S>, output: ResultCallback) {
        let depth = self.current_depth;
        let carrier = Frame::new(depth, ResultCallback::empty(), FrameControl::new(depth));
        self.queue_next(QueueEntry::new(carrier, Box::new(IsolatedCall::new(task, output))));
    }

    /// Drains the queue.
    ///
    /// # Errors
    ///
    /// Returns the error that aborted the run. Pending work is dropped and the
    /// failing entry's frame reports a failure.
    pub fn run(&mut self) -> Result<RunSummary> {
        self.push_staged();
        debug!(pending = self.queue.len(), "run started");
        while let Some(entry) = self.queue.pop_front() {
            if !entry.is_live() {
                continue;
            }
            let frame = entry.frame().clone();
            self.current_depth = frame.depth();
            self.max_depth = self.max_depth.max(frame.depth());

            if let Err(err) = entry.execute(self) {
                warn!(cost = self.cost, depth = frame.depth(), error = %err, "run aborted");
                return Err(self.abort(&frame, err));
            }
            self.push_staged();
            if self.queue_overflow {
                let limit = self.config.queue_limit;
                error!(limit, "command queue overflow");
                let err = Error::limit_exceeded(SemanticLimit::QueueOverflow { limit });
                return Err(self.abort(&frame, err));
            }
        }
        debug!(cost = self.cost, max_depth = self.max_depth, "run finished");
        Ok(RunSummary {
            cost: self.cost,
            max_depth: self.max_depth,
        })
    }

    fn abort(&mut self, frame: &Frame, err: Error) -> Error {
        self.queue.clear();
        self.staged.clear();
        self.queue_overflow = false;
        frame.return_failure();
        err
    }
}

impl<S: ExecutionSource> Default for ExecutionContext<S> {
    fn default() -> Self {
        Self::new(ExecutionConfig::default())
    }
}

impl<S: ExecutionSource> fmt::Debug for ExecutionContext<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("config", &self.config)
            .field("cost", &self.cost)
            .field("pending", &self.pending())
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

/// A handle given to custom executors: the context plus the current frame.
pub struct ExecutionControl<'a, S: ExecutionSource> {
    context: &'a mut ExecutionContext<S>,
    frame: Frame,
}

impl<'a, S: ExecutionSource> ExecutionControl<'a, S> {
    /// Creates a handle for `frame`.
    pub fn new(context: &'a mut ExecutionContext<S>, frame: Frame) -> Self {
        Self { context, frame }
    }

    /// Queues an action in the current frame.
    pub fn queue_next(&mut self, action: Box<dyn EntryAction<S>>) {
        let entry = QueueEntry::new(self.frame.clone(), action);
        self.context.queue_next(entry);
    }

    /// Queues an isolated call under the current frame.
    pub fn queue_isolated(&mut self, task: IsolatedTask<S>, output: ResultCallback) {
        self.queue_next(Box::new(IsolatedCall::new(task, output)));
    }

    /// Returns the current frame.
    #[must_use]
    pub fn current_frame(&self) -> &Frame {
        &self.frame
    }

    /// Returns the tracer, if one is attached.
    pub fn tracer(&mut self) -> Option<&mut (dyn TraceCallbacks + 'static)> {
        self.context.tracer()
    }

    /// Returns the underlying context.
    pub fn context(&mut self) -> &mut ExecutionContext<S> {
        self.context
    }
}
