//! Integration tests for diagnostic hooks
//!
//! Tests that tracers see commands, returns, calls, and errors, and that
//! profiler sections are balanced.

use std::cell::RefCell;
use std::rc::Rc;

use cascade_engine::{ExecutionConfig, ExecutionContext, Profiler, ResultCallback, TraceCallbacks, parse_command};
use cascade_stdlib::{Host, load_lines};

#[derive(Default)]
struct Recorder {
    commands: Vec<(usize, String)>,
    returns: Vec<i32>,
    calls: Vec<(String, usize)>,
    errors: Vec<String>,
    open: usize,
    sections: Vec<String>,
}

impl TraceCallbacks for Recorder {
    fn on_command(&mut self, depth: usize, command: &str) {
        self.commands.push((depth, command.to_string()));
    }

    fn on_return(&mut self, _depth: usize, _command: &str, result: i32) {
        self.returns.push(result);
    }

    fn on_call(&mut self, _depth: usize, function: &str, size: usize) {
        self.calls.push((function.to_string(), size));
    }

    fn on_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

impl Profiler for Recorder {
    fn push(&mut self, section: &dyn Fn() -> String) {
        self.open += 1;
        self.sections.push(section());
    }

    fn pop(&mut self) {
        self.open -= 1;
    }
}

fn traced(host: &Rc<Host>, input: &str) -> Rc<RefCell<Recorder>> {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let console = host.console();
    let parsed = parse_command(host.dispatcher().as_ref(), &console, input).unwrap();
    let mut context = ExecutionContext::new(ExecutionConfig::default())
        .with_tracer(Rc::clone(&recorder))
        .with_profiler(Rc::clone(&recorder));
    context.queue_initial_command_execution(&parsed, console, ResultCallback::empty());
    context.run().unwrap();
    recorder
}

#[test]
fn commands_and_returns_are_traced() {
    let host = Host::new();
    let recorder = traced(&host, "say hi");
    let recorder = recorder.borrow();
    assert_eq!(recorder.commands.len(), 1);
    assert_eq!(recorder.commands[0].0, 0);
    assert!(recorder.commands[0].1.contains("say hi"));
    assert_eq!(recorder.returns, [1]);
    assert!(recorder.errors.is_empty());
}

#[test]
fn calls_report_the_body_size() {
    let host = Host::new();
    load_lines(&host, "demo:two", &["say a", "# note", "say b"]).unwrap();
    let recorder = traced(&host, "function demo:two");
    let recorder = recorder.borrow();
    assert_eq!(recorder.calls, [("demo:two".to_string(), 2)]);
    assert!(recorder.commands.iter().any(|(depth, _)| *depth == 1));
}

#[test]
fn forked_errors_reach_the_tracer_but_not_the_source() {
    let host = Host::new();
    let recorder = traced(&host, "execute as a,b run fail boom");
    let recorder = recorder.borrow();
    assert_eq!(recorder.errors.len(), 2);
    assert!(recorder.errors.iter().all(|message| message.contains("boom")));
    assert!(host.failures().is_empty());
}

#[test]
fn profiler_sections_are_balanced() {
    let host = Host::new();
    let recorder = traced(&host, "execute as a,b,c run say hi");
    let recorder = recorder.borrow();
    assert_eq!(recorder.open, 0);
    assert!(!recorder.sections.is_empty());
}
