//! Integration tests for run limits
//!
//! Tests the cost ceiling, the per-step fork limit, and the queue limit.

use std::rc::Rc;

use cascade_engine::{
    ExecutionConfig, ExecutionContext, Frame, FrameControl, QueueEntry, ResultCallback, from_fn, parse_command,
};
use cascade_foundation::{ErrorKind, SemanticLimit};
use cascade_stdlib::{Host, ScriptSource, load_lines};

fn run(host: &Rc<Host>, config: ExecutionConfig, input: &str) -> cascade_foundation::Result<usize> {
    let console = host.console();
    let parsed = parse_command(host.dispatcher().as_ref(), &console, input).unwrap();
    let mut context = ExecutionContext::new(config);
    context.queue_initial_command_execution(&parsed, console, ResultCallback::empty());
    context.run().map(|summary| summary.cost)
}

// =============================================================================
// Cost Ceiling
// =============================================================================

#[test]
fn runaway_recursion_hits_the_cost_ceiling() {
    let host = Host::new();
    load_lines(&host, "demo:forever", &["counter add calls 1", "function demo:forever"]).unwrap();

    let err = run(&host, ExecutionConfig::new().with_command_limit(300), "function demo:forever").unwrap_err();
    assert!(err.is_limit());
    assert!(matches!(
        err.kind,
        ErrorKind::LimitExceeded(SemanticLimit::CommandCost { limit: 300 })
    ));
    assert!(host.counter("calls") > 0);
}

#[test]
fn cost_is_charged_per_command() {
    let host = Host::new();
    assert_eq!(run(&host, ExecutionConfig::default(), "say one").unwrap(), 1);
    let cost = run(&host, ExecutionConfig::default(), "execute as a,b,c run say hi").unwrap();
    assert!(cost >= 3);
}

#[test]
fn a_run_within_budget_finishes() {
    let host = Host::new();
    load_lines(&host, "demo:three", &["say a", "say b", "say c"]).unwrap();
    let cost = run(&host, ExecutionConfig::default(), "function demo:three").unwrap();
    assert!(cost >= 4);
    assert!(run(&host, ExecutionConfig::new().with_command_limit(cost), "function demo:three").is_ok());
    assert!(run(&host, ExecutionConfig::new().with_command_limit(cost - 1), "function demo:three").is_err());
}

// =============================================================================
// Fork Limit
// =============================================================================

#[test]
fn fork_limit_bounds_one_step_not_the_run() {
    let host = Host::new();
    let config = ExecutionConfig::new().with_fork_limit(2);

    load_lines(&host, "demo:fan", &["execute as c,d run say hi"]).unwrap();

    run(&host, config.clone(), "execute as a,b run function demo:fan").unwrap();
    assert_eq!(host.messages().len(), 4);
    assert!(host.failures().is_empty());

    host.take_output();
    run(&host, config, "execute as a,b,c run say hi").unwrap();
    assert!(host.messages().is_empty());
    assert_eq!(host.failures(), ["[console] error: Maximum number of contexts (2) reached"]);
}

// =============================================================================
// Queue Limit
// =============================================================================

#[test]
fn queue_overflow_aborts_the_run() {
    let mut context = ExecutionContext::<ScriptSource>::new(ExecutionConfig::new().with_queue_limit(2));
    let frame = Frame::new(0, ResultCallback::empty(), FrameControl::new(0));
    context.queue_next(QueueEntry::new(
        frame,
        from_fn(|context: &mut ExecutionContext<ScriptSource>, frame| {
            for _ in 0..3 {
                context.queue_next(QueueEntry::new(frame.clone(), from_fn(|_, _| Ok(()))));
            }
            Ok(())
        }),
    ));

    let err = context.run().unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::LimitExceeded(SemanticLimit::QueueOverflow { limit: 2 })
    ));
    assert_eq!(context.pending(), 0);
}
