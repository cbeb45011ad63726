//! Integration tests for frames and returns
//!
//! Tests that a return ends exactly the work of its frame, and that isolated
//! calls open a frame of their own.

use std::cell::Cell;
use std::rc::Rc;

use cascade_engine::{
    ExecutionConfig, ExecutionContext, ExecutionSource, FrameControl, ResultCallback, RunSummary, parse_command,
};
use cascade_foundation::Result;
use cascade_stdlib::{Host, load_lines};

type Outcome = (Option<(bool, i32)>, Result<RunSummary>);

fn run(host: &Rc<Host>, input: &str) -> Outcome {
    run_with(host, ExecutionConfig::default(), input)
}

fn run_with(host: &Rc<Host>, config: ExecutionConfig, input: &str) -> Outcome {
    let last = Rc::new(Cell::new(None));
    let sink = Rc::clone(&last);
    let callback = ResultCallback::new(move |success, value| sink.set(Some((success, value))));
    let console = host.console().with_callback(callback.clone());
    let parsed = parse_command(host.dispatcher().as_ref(), &console, input).unwrap();

    let mut context = ExecutionContext::new(config);
    context.queue_initial_command_execution(&parsed, console, callback);
    let summary = context.run();
    (last.get(), summary)
}

// =============================================================================
// Frame Control
// =============================================================================

#[test]
fn discard_only_affects_older_generations() {
    let control = FrameControl::new(3);
    assert_eq!(control.depth(), 3);
    let before = control.generation();
    control.discard();
    assert!(!control.is_live(before));
    assert!(control.is_live(control.generation()));
}

// =============================================================================
// Returns
// =============================================================================

#[test]
fn return_ends_only_the_callee() {
    let host = Host::new();
    load_lines(&host, "demo:inner", &["say in", "return 1", "say never"]).unwrap();
    load_lines(&host, "demo:outer", &["function demo:inner", "say after"]).unwrap();

    let (_, summary) = run(&host, "function demo:outer");
    summary.unwrap();
    assert_eq!(host.messages(), ["[console] in", "[console] after"]);
}

#[test]
fn callee_body_finishes_before_the_callers_next_line() {
    let host = Host::new();
    load_lines(&host, "demo:inner", &["say i0", "say i1", "say i2"]).unwrap();
    load_lines(&host, "demo:outer", &["function demo:inner", "say l1", "say l2"]).unwrap();

    run(&host, "function demo:outer").1.unwrap();
    assert_eq!(
        host.messages(),
        ["[console] i0", "[console] i1", "[console] i2", "[console] l1", "[console] l2"]
    );
}

#[test]
fn next_line_sees_the_callees_effects() {
    let host = Host::new();
    load_lines(&host, "demo:inc", &["counter add x 1"]).unwrap();
    load_lines(&host, "demo:main", &["function demo:inc", "execute if counter x 1 run say yes"]).unwrap();

    run(&host, "function demo:main").1.unwrap();
    assert_eq!(host.counter("x"), 1);
    assert_eq!(host.messages(), ["[console] yes"]);
}

#[test]
fn forked_calls_run_one_source_at_a_time() {
    let host = Host::new();
    load_lines(&host, "demo:two", &["say 1", "say 2"]).unwrap();

    run(&host, "execute as a,b run function demo:two").1.unwrap();
    assert_eq!(host.messages(), ["[a] 1", "[a] 2", "[b] 1", "[b] 2"]);
}

#[test]
fn return_run_function_ends_the_caller_too() {
    let host = Host::new();
    load_lines(&host, "demo:inner", &["say in", "return 7", "say never"]).unwrap();
    load_lines(
        &host,
        "demo:outer",
        &["say before", "return run function demo:inner", "say skipped"],
    )
    .unwrap();

    let (outcome, summary) = run(&host, "function demo:outer");
    summary.unwrap();
    assert_eq!(host.messages(), ["[console] before", "[console] in"]);
    assert_eq!(outcome, Some((true, 7)));
}

#[test]
fn return_fail_reports_failure() {
    let host = Host::new();
    load_lines(&host, "demo:fails", &["return fail", "say never"]).unwrap();
    let (outcome, _) = run(&host, "return run function demo:fails");
    assert_eq!(outcome, Some((false, 0)));
    assert!(host.messages().is_empty());
}

#[test]
fn deep_recursion_does_not_touch_the_host_stack() {
    let host = Host::new();
    load_lines(
        &host,
        "demo:down",
        &["counter add depth -1", "execute if counter depth 1 run function demo:down"],
    )
    .unwrap();
    host.set_counter("depth", 20_000);

    let config = ExecutionConfig::new().with_command_limit(1_000_000);
    let (_, summary) = run_with(&host, config, "function demo:down");
    let summary = summary.unwrap();
    assert_eq!(host.counter("depth"), 0);
    assert!(summary.max_depth >= 20_000);
}

// =============================================================================
// Isolated Calls
// =============================================================================

#[test]
fn trigger_return_does_not_end_the_caller() {
    let host = Host::new();
    load_lines(&host, "demo:t", &["say triggered", "return 4"]).unwrap();
    load_lines(&host, "demo:caller", &["trigger demo:t", "say after"]).unwrap();

    let (_, summary) = run(&host, "function demo:caller");
    summary.unwrap();
    assert_eq!(host.messages(), ["[console] triggered", "[console] after"]);
}

#[test]
fn each_triggered_source_gets_its_own_frame() {
    let host = Host::new();
    load_lines(&host, "demo:t", &["say in", "return 4", "say never"]).unwrap();

    run(&host, "execute as a,b run trigger demo:t").1.unwrap();
    assert_eq!(host.messages(), ["[a] in", "[b] in"]);
}
