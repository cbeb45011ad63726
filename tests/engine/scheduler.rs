//! Integration tests for the continuation scheduler
//!
//! Tests FIFO order and the bounded queue footprint of large fan-outs.

use std::cell::RefCell;
use std::rc::Rc;

use cascade_engine::{
    ExecutionConfig, ExecutionContext, Frame, FrameControl, QueueEntry, ResultCallback, from_fn, schedule,
};
use cascade_stdlib::ScriptSource;
use proptest::prelude::*;

/// Runs a fan-out of `n` items and returns the visit order and the largest
/// queue length seen by any item.
fn fan_out(n: usize) -> (Vec<usize>, usize) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let peak = Rc::new(RefCell::new(0usize));

    let mut context = ExecutionContext::<ScriptSource>::new(ExecutionConfig::default());
    let frame = Frame::new(0, ResultCallback::empty(), FrameControl::new(0));
    let items: Rc<[usize]> = (0..n).collect();

    let (sink, high) = (Rc::clone(&log), Rc::clone(&peak));
    schedule(&mut context, &frame, items, move |frame, &item| {
        let (sink, high) = (Rc::clone(&sink), Rc::clone(&high));
        QueueEntry::new(
            frame.clone(),
            from_fn(move |context: &mut ExecutionContext<ScriptSource>, _frame| {
                sink.borrow_mut().push(item);
                let pending = context.pending();
                let mut high = high.borrow_mut();
                *high = (*high).max(pending);
                Ok(())
            }),
        )
    });
    context.run().unwrap();

    let order = log.borrow().clone();
    let peak = *peak.borrow();
    (order, peak)
}

#[test]
fn empty_fan_out_queues_nothing() {
    let (order, _) = fan_out(0);
    assert!(order.is_empty());
}

#[test]
fn small_fan_outs_run_in_order() {
    assert_eq!(fan_out(1).0, [0]);
    assert_eq!(fan_out(2).0, [0, 1]);
    assert_eq!(fan_out(3).0, [0, 1, 2]);
}

#[test]
fn large_fan_out_keeps_the_queue_short() {
    let (order, peak) = fan_out(10_000);
    assert_eq!(order.len(), 10_000);
    assert!(order.windows(2).all(|w| w[0] + 1 == w[1]));
    assert!(peak <= 1, "peak pending was {peak}");
}

proptest! {
    #[test]
    fn fan_out_visits_every_item_once_in_order(n in 0usize..300) {
        let (order, peak) = fan_out(n);
        prop_assert_eq!(order, (0..n).collect::<Vec<_>>());
        prop_assert!(peak <= 1);
    }
}
