//! The trampoline: fan-out of follow-up work without native recursion.
//!
//! Scheduling `N` items never pushes more than two entries at a time. Larger
//! fan-outs push the first item plus a [`ContinuationTask`] that, when popped,
//! pushes the next item and re-queues itself.

use std::rc::Rc;

use cascade_foundation::Result;

use crate::action::{EntryAction, QueueEntry};
use crate::context::ExecutionContext;
use crate::frame::Frame;
use crate::source::ExecutionSource;

type EntryFactory<S, P> = dyn Fn(&Frame, &P) -> QueueEntry<S>;

/// Queues one entry per item, in order.
pub fn schedule<S, P>(
    context: &mut ExecutionContext<S>,
    frame: &Frame,
    items: Rc<[P]>,
    factory: impl Fn(&Frame, &P) -> QueueEntry<S> + 'static,
) where
    S: ExecutionSource,
    P: 'static,
{
    match items.len() {
        0 => {}
        1 | 2 => {
            for item in items.iter() {
                context.queue_next(factory(frame, item));
            }
        }
        _ => {
            context.queue_next(factory(frame, &items[0]));
            let task = ContinuationTask {
                factory: Rc::new(factory),
                items,
                index: 1,
            };
            context.queue_next(QueueEntry::new(frame.clone(), Box::new(task)));
        }
    }
}

/// The self-re-queueing remainder of a fan-out.
pub struct ContinuationTask<S: ExecutionSource, P> {
    factory: Rc<EntryFactory<S, P>>,
    items: Rc<[P]>,
    index: usize,
}

impl<S: ExecutionSource, P: 'static> EntryAction<S> for ContinuationTask<S, P> {
    fn execute(self: Box<Self>, context: &mut ExecutionContext<S>, frame: &Frame) -> Result<()> {
        let mut task = *self;
        context.queue_next((task.factory)(frame, &task.items[task.index]));
        task.index += 1;
        if task.index < task.items.len() {
            context.queue_next(QueueEntry::new(frame.clone(), Box::new(task)));
        }
        Ok(())
    }
}
