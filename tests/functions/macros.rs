//! Tests for macro instantiation and the instance cache

use std::rc::Rc;

use cascade_engine::{CommandFunction, ExecutionConfig, ExecutionContext, MacroFunction, ResultCallback, parse_command};
use cascade_foundation::{ArgRecord, ArgValue};
use cascade_stdlib::{Host, ScriptSource, load_lines};

fn run(host: &Rc<Host>, input: &str) {
    let console = host.console();
    let parsed = parse_command(host.dispatcher().as_ref(), &console, input).unwrap();
    let mut context = ExecutionContext::new(ExecutionConfig::default());
    context.queue_initial_command_execution(&parsed, console, ResultCallback::empty());
    context.run().unwrap();
}

fn with_macro<T>(host: &Rc<Host>, id: &str, check: impl FnOnce(&MacroFunction<ScriptSource>) -> T) -> T {
    let function = host.function(id).unwrap();
    match function.as_ref() {
        CommandFunction::Macro(function) => check(function),
        CommandFunction::Plain(_) => panic!("{id} is not a macro function"),
    }
}

fn key(n: i32) -> Vec<String> {
    vec![n.to_string()]
}

fn numbered(n: i32) -> ArgRecord {
    ArgRecord::new().with("n", n)
}

// =============================================================================
// Instantiation
// =============================================================================

#[test]
fn parameters_are_listed_in_first_seen_order() {
    let host = Host::new();
    load_lines(&host, "demo:m", &["say start", "$say $(b) $(a)", "$say $(a) $(c)"]).unwrap();
    let function = host.function("demo:m").unwrap();
    assert!(function.is_macro());
    assert_eq!(function.parameters(), ["b", "a", "c"]);
    host.clear_functions();
}

#[test]
fn instances_are_named_after_the_function() {
    let host = Host::new();
    load_lines(&host, "demo:m", &["$say $(n)"]).unwrap();
    let function = host.function("demo:m").unwrap();

    let one = function.instantiate(Some(&numbered(1))).unwrap();
    let two = function.instantiate(Some(&numbered(2))).unwrap();
    let suffix = one.id().as_str().strip_prefix("demo:m/").unwrap();
    assert!(suffix.parse::<u64>().is_ok());
    assert_ne!(one.id(), two.id());
    assert_eq!(one.len(), 1);
    host.clear_functions();
}

#[test]
fn arguments_are_stringified_for_substitution() {
    let host = Host::new();
    load_lines(&host, "demo:show", &["$say $(text) $(ratio) $(list)"]).unwrap();
    let arguments = ArgRecord::new()
        .with("text", "plain")
        .with("ratio", 0.5)
        .with("list", ArgValue::List(vec![ArgValue::Int(1), ArgValue::Int(2)]));
    let function = host.function("demo:show").unwrap();
    function.instantiate(Some(&arguments)).unwrap();

    with_macro(&host, "demo:show", |function| {
        assert!(function.is_cached(&["plain".to_string(), "0.5".to_string(), "[1,2]".to_string()]));
    });
    host.clear_functions();
}

#[test]
fn missing_arguments_are_command_errors() {
    let host = Host::new();
    load_lines(&host, "demo:m", &["$say $(n) $(m)"]).unwrap();
    let function = host.function("demo:m").unwrap();

    let err = function.instantiate(None).unwrap_err();
    assert_eq!(err.message().render(), "Can't call macro function demo:m without arguments");

    let err = function.instantiate(Some(&numbered(1))).unwrap_err();
    assert_eq!(err.message().render(), "Function demo:m is missing argument m");
    with_macro(&host, "demo:m", |function| assert_eq!(function.cache_len(), 0));
    host.clear_functions();
}

#[test]
fn extra_arguments_are_ignored() {
    let host = Host::new();
    load_lines(&host, "demo:m", &["$say $(n)"]).unwrap();
    let function = host.function("demo:m").unwrap();
    let plain = function.instantiate(Some(&numbered(3))).unwrap();
    let extra = function.instantiate(Some(&numbered(3).with("unused", "x"))).unwrap();
    assert!(Rc::ptr_eq(&plain, &extra));
    host.clear_functions();
}

// =============================================================================
// Cache
// =============================================================================

#[test]
fn hits_return_the_cached_body() {
    let host = Host::new();
    load_lines(&host, "demo:m", &["$say $(n)"]).unwrap();
    let function = host.function("demo:m").unwrap();
    let first = function.instantiate(Some(&numbered(7))).unwrap();
    let second = function.instantiate(Some(&numbered(7))).unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    with_macro(&host, "demo:m", |function| assert_eq!(function.cache_len(), 1));
    host.clear_functions();
}

#[test]
fn cache_keeps_the_eight_most_recent() {
    let host = Host::new();
    load_lines(&host, "demo:m", &["$say $(n)"]).unwrap();
    let function = host.function("demo:m").unwrap();

    for n in 0..8 {
        function.instantiate(Some(&numbered(n))).unwrap();
    }
    // Touch 0 so 1 becomes the least recent.
    function.instantiate(Some(&numbered(0))).unwrap();
    function.instantiate(Some(&numbered(8))).unwrap();

    with_macro(&host, "demo:m", |function| {
        assert_eq!(function.cache_len(), 8);
        assert!(function.is_cached(&key(0)));
        assert!(!function.is_cached(&key(1)));
        assert!((2..=8).all(|n| function.is_cached(&key(n))));
    });
    host.clear_functions();
}

#[test]
fn failed_instantiations_are_not_cached() {
    let host = Host::new();
    load_lines(&host, "demo:add", &["$counter add x $(n)"]).unwrap();
    let function = host.function("demo:add").unwrap();

    let err = function.instantiate(Some(&ArgRecord::new().with("n", "lots"))).unwrap_err();
    let text = err.message().render();
    assert!(text.starts_with("While instantiating macro demo:add/"));
    assert!(text.contains("counter add x lots"));
    with_macro(&host, "demo:add", |function| assert_eq!(function.cache_len(), 0));
    host.clear_functions();
}

// =============================================================================
// Calls
// =============================================================================

#[test]
fn macro_calls_substitute_into_commands() {
    let host = Host::new();
    load_lines(&host, "demo:greet", &["say hello", "$say hi $(name)"]).unwrap();
    run(&host, "function demo:greet {name:bob}");
    assert_eq!(host.messages(), ["[console] hello", "[console] hi bob"]);
    host.clear_functions();
}

#[test]
fn instantiation_failures_reach_the_caller() {
    let host = Host::new();
    load_lines(&host, "demo:add", &["$counter add x $(n)"]).unwrap();
    run(&host, "function demo:add {n:oops}");
    let failures = host.failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("While instantiating macro demo:add/"));
    assert_eq!(host.counter("x"), 0);
    host.clear_functions();
}
