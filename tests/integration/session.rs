//! Tests for sessions running whole programs

use cascade_foundation::{ErrorKind, SemanticLimit};
use cascade_runtime::{Outcome, RunReport, Session};
use cascade_engine::ExecutionConfig;
use cascade_stdlib::OutputLine;

fn messages(report: &RunReport) -> Vec<String> {
    report
        .output
        .iter()
        .filter(|line| matches!(line, OutputLine::Message { .. }))
        .map(ToString::to_string)
        .collect()
}

// =============================================================================
// Programs
// =============================================================================

#[test]
fn recursive_countdown_stops_on_its_condition() {
    let session = Session::new();
    session
        .load_function(
            "demo:count",
            "counter add n 1\nexecute unless counter n 10 run function demo:count",
        )
        .unwrap();

    let report = session.run_function("demo:count", None);
    assert!(report.is_success());
    assert_eq!(session.host().counter("n"), 10);
    assert_eq!(report.max_depth, 10);
}

#[test]
fn state_carries_over_between_submissions() {
    let session = Session::new();
    session.run_command("counter set score 4");
    session.run_command("counter add score 3");
    let report = session.run_command("counter get score");
    assert_eq!(report.outcome, Some(Outcome { success: true, value: 7 }));
}

#[test]
fn return_run_reports_the_tail_result() {
    let session = Session::new();
    session
        .load_function("demo:check", "return run execute if counter n 5\nsay unreachable")
        .unwrap();

    session.run_command("counter set n 6");
    let report = session.run_function("demo:check", None);
    assert_eq!(report.outcome, Some(Outcome { success: true, value: 1 }));
    assert!(messages(&report).is_empty());

    session.run_command("counter set n 1");
    let report = session.run_function("demo:check", None);
    assert_eq!(report.outcome.map(|outcome| outcome.success), Some(false));
    assert!(messages(&report).is_empty());
}

#[test]
fn macro_programs_compose_with_plain_ones() {
    let session = Session::new();
    session.load_function("demo:greet", "$say hello $(who)").unwrap();
    session
        .load_function("demo:party", "function demo:greet {who:ann}\nfunction demo:greet {who:bo}")
        .unwrap();

    let report = session.run_function("demo:party", None);
    assert_eq!(messages(&report), ["[console] hello ann", "[console] hello bo"]);
}

#[test]
fn silent_failures_leave_no_output() {
    let session = Session::new();
    let report = session.run_command("execute silent run fail quietly");
    assert!(report.output.is_empty());
    assert_eq!(report.outcome.map(|outcome| outcome.success), Some(false));
}

// =============================================================================
// Limits
// =============================================================================

#[test]
fn fork_limit_stops_a_wide_fan_out() {
    let mut session = Session::new();
    session.set_execution_config(ExecutionConfig::new().with_fork_limit(3));
    let report = session.run_command("execute as a,b,c,d run say hi");
    assert!(messages(&report).is_empty());
    let failure = report.output.first().map(ToString::to_string).unwrap_or_default();
    assert!(failure.contains("Maximum number of contexts (3) reached"));
    assert!(report.abort.is_none());
}

#[test]
fn queue_limit_aborts_a_run() {
    let mut session = Session::new();
    session.set_execution_config(ExecutionConfig::new().with_queue_limit(1));
    session.load_function("demo:wide", "say a\nsay b\nsay c").unwrap();
    let report = session.run_function("demo:wide", None);
    let abort = report.abort.unwrap();
    assert!(matches!(abort.kind, ErrorKind::LimitExceeded(SemanticLimit::QueueOverflow { limit: 1 })));
}

#[test]
fn aborted_runs_do_not_poison_the_session() {
    let mut session = Session::new();
    session.set_execution_config(ExecutionConfig::new().with_command_limit(20));
    session.load_function("demo:loop", "function demo:loop").unwrap();
    assert!(session.run_function("demo:loop", None).abort.is_some());

    let report = session.run_command("say recovered");
    assert!(report.is_success());
    assert_eq!(messages(&report), ["[console] recovered"]);
}

// =============================================================================
// Diagnostics
// =============================================================================

#[test]
fn tracing_records_the_last_run() {
    let mut session = Session::new();
    session.load_function("demo:f", "say inside").unwrap();
    session.set_tracing(true);
    session.run_command("function demo:f");

    let trace = session.last_trace();
    assert!(trace.contains("demo:f"));
    assert!(trace.contains("say inside"));

    session.set_tracing(false);
    let before = session.tracer().buffer().len();
    session.run_command("say untraced");
    assert_eq!(session.tracer().buffer().len(), before);
}

#[test]
fn profiling_times_prepare_and_execute_sections() {
    let mut session = Session::new();
    session.set_profiling(true);
    session.run_command("say timed");
    session.run_command("say timed");

    let profiler = session.profiler();
    assert_eq!(profiler.get("prepare say timed").map(|stats| stats.calls), Some(2));
    assert_eq!(profiler.get("execute say timed").map(|stats| stats.calls), Some(2));
    assert_eq!(profiler.depth(), 0);
    drop(profiler);

    session.reset_profile();
    assert!(session.profiler().report().is_empty());
}
