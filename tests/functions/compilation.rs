//! Tests for compiling function source against the standard grammar

use cascade_engine::CommandFunction;
use cascade_foundation::ErrorKind;
use cascade_stdlib::{Host, ScriptSource};

fn compile(lines: &[&str]) -> cascade_foundation::Result<CommandFunction<ScriptSource>> {
    let host = Host::new();
    CommandFunction::from_lines("demo:f", &host.compiler(), lines)
}

fn inputs(function: &CommandFunction<ScriptSource>) -> Vec<String> {
    let body = function.instantiate(None).unwrap();
    body.entries().iter().map(|entry| entry.input().to_string()).collect()
}

#[test]
fn execute_chains_continue_across_lines() {
    let function = compile(&["# fan out", "execute as a,b \\", "   run \\", "say hi", "", "say done"]).unwrap();
    assert!(!function.is_macro());
    assert_eq!(inputs(&function), ["execute as a,b run say hi", "say done"]);
}

#[test]
fn identical_sources_compile_alike() {
    let lines = ["counter add n 1", "execute if counter n 3 run say three", "function demo:f {n:1}"];
    assert_eq!(inputs(&compile(&lines).unwrap()), inputs(&compile(&lines).unwrap()));
}

#[test]
fn empty_function_has_an_empty_body() {
    let function = compile(&["# only a comment"]).unwrap();
    assert!(function.instantiate(None).unwrap().is_empty());
}

#[test]
fn errors_name_the_function_and_line() {
    let err = compile(&["say ok", "# skip", "dance"]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::LineParse { line: 3, .. }));
    let context = err.context.unwrap();
    assert_eq!(context.source.as_deref(), Some("demo:f"));
    assert_eq!(context.line, Some(3));
}

#[test]
fn grammar_errors_are_caught_at_compile_time() {
    let err = compile(&["execute as a,b"]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::LineParse { line: 1, .. }));

    let err = compile(&["function demo:g {n:1} extra"]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::LineParse { .. }));
}

#[test]
fn macro_lines_are_checked_but_not_parsed() {
    let function = compile(&["$dance $(steps)"]).unwrap();
    assert!(function.is_macro());

    let err = compile(&["say a", "$say $(name"]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MacroLine { line: 2, .. }));

    let err = compile(&["$say $(bad-name)"]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MacroLine { .. }));
}
