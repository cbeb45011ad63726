//! Queue entries and the actions they carry.
//!
//! There are two kinds of action. An [`EntryAction`] is ready to run: it owns
//! everything it needs and is consumed by running. An [`UnboundEntryAction`]
//! still needs a source; compiled function bodies are lists of these, and
//! [`bind`] pairs one with a source when the body is called.

use std::rc::Rc;

use cascade_foundation::Result;

use crate::context::ExecutionContext;
use crate::frame::Frame;
use crate::source::ExecutionSource;

/// A unit of work ready to be queued.
pub trait EntryAction<S: ExecutionSource> {
    /// Runs the action inside `frame`.
    ///
    /// # Errors
    ///
    /// Returns an error only for conditions that abort the whole run.
    fn execute(self: Box<Self>, context: &mut ExecutionContext<S>, frame: &Frame) -> Result<()>;
}

/// A unit of work that still needs a source.
pub trait UnboundEntryAction<S: ExecutionSource> {
    /// Runs the action on behalf of `source` inside `frame`.
    ///
    /// # Errors
    ///
    /// Returns an error only for conditions that abort the whole run.
    fn execute(&self, source: &S, context: &mut ExecutionContext<S>, frame: &Frame) -> Result<()>;
}

struct BoundEntryAction<S: ExecutionSource> {
    action: Rc<dyn UnboundEntryAction<S>>,
    source: S,
}

impl<S: ExecutionSource> EntryAction<S> for BoundEntryAction<S> {
    fn execute(self: Box<Self>, context: &mut ExecutionContext<S>, frame: &Frame) -> Result<()> {
        self.action.execute(&self.source, context, frame)
    }
}

/// Pairs an unbound action with the source it will run for.
#[must_use]
pub fn bind<S: ExecutionSource>(
    action: Rc<dyn UnboundEntryAction<S>>,
    source: S,
) -> Box<dyn EntryAction<S>> {
    Box::new(BoundEntryAction { action, source })
}

struct FnAction<F>(F);

impl<S, F> EntryAction<S> for FnAction<F>
where
    S: ExecutionSource,
    F: FnOnce(&mut ExecutionContext<S>, &Frame) -> Result<()>,
{
    fn execute(self: Box<Self>, context: &mut ExecutionContext<S>, frame: &Frame) -> Result<()> {
        (self.0)(context, frame)
    }
}

/// Wraps a closure as an action.
#[must_use]
pub fn from_fn<S, F>(f: F) -> Box<dyn EntryAction<S>>
where
    S: ExecutionSource,
    F: FnOnce(&mut ExecutionContext<S>, &Frame) -> Result<()> + 'static,
{
    Box::new(FnAction(f))
}

/// Ends the current frame with a failure.
///
/// Queued when a chain asked for a return but ran out of sources, so the
/// enclosing frame still hears an outcome.
#[derive(Clone, Copy, Debug, Default)]
pub struct FallthroughTask;

impl<S: ExecutionSource> EntryAction<S> for FallthroughTask {
    fn execute(self: Box<Self>, _context: &mut ExecutionContext<S>, frame: &Frame) -> Result<()> {
        frame.return_failure();
        Ok(())
    }
}

/// A frame and an action: the atomic unit on the run queue.
pub struct QueueEntry<S: ExecutionSource> {
    frame: Frame,
    generation: u32,
    action: Box<dyn EntryAction<S>>,
}

impl<S: ExecutionSource> QueueEntry<S> {
    /// Creates an entry stamped with the frame's current generation.
    #[must_use]
    pub fn new(frame: Frame, action: Box<dyn EntryAction<S>>) -> Self {
        let generation = frame.control().generation();
        Self {
            frame,
            generation,
            action,
        }
    }

    /// Returns the frame this entry runs in.
    #[must_use]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Returns false once the frame discarded the work queued before it.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.frame.control().is_live(self.generation)
    }

    /// Runs the action.
    ///
    /// # Errors
    ///
    /// Returns an error only for conditions that abort the whole run.
    pub fn execute(self, context: &mut ExecutionContext<S>) -> Result<()> {
        let Self { frame, action, .. } = self;
        action.execute(context, &frame)
    }
}

impl<S: ExecutionSource> std::fmt::Debug for QueueEntry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueEntry")
            .field("frame", &self.frame)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
