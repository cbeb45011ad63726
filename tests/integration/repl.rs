//! Tests for the REPL driven by scripted input

use std::collections::VecDeque;
use std::fs;

use cascade_foundation::Result;
use cascade_runtime::{LineEditor, ReadResult, Repl, Session};

#[derive(Default)]
struct ScriptedEditor {
    lines: VecDeque<String>,
    history: Vec<String>,
}

impl ScriptedEditor {
    fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|line| (*line).to_string()).collect(),
            history: Vec::new(),
        }
    }

    fn next(&mut self) -> ReadResult {
        match self.lines.pop_front() {
            Some(line) => ReadResult::Line(line),
            None => ReadResult::Eof,
        }
    }
}

impl LineEditor for ScriptedEditor {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadResult> {
        Ok(self.next())
    }

    fn read_continuation(&mut self, _prompt: &str) -> Result<ReadResult> {
        Ok(self.next())
    }

    fn add_history(&mut self, line: &str) {
        self.history.push(line.to_string());
    }

    fn set_keywords(&mut self, _keywords: Vec<String>) {}
}

fn repl(lines: &[&str]) -> Repl<ScriptedEditor> {
    Repl::with_editor(ScriptedEditor::new(lines)).without_banner()
}

#[test]
fn session_state_survives_the_loop() {
    let mut repl = repl(&["counter add n 2", "counter add n \\", "  3", ":quit", "counter add n 100"]);
    repl.run().unwrap();
    assert_eq!(repl.session().host().counter("n"), 5);
    assert_eq!(repl.failures(), 0);
}

#[test]
fn compound_arguments_continue_across_lines() {
    let session = Session::new();
    session.load_function("demo:add", "$counter add $(name) $(n)").unwrap();
    let mut repl = repl(&[":run demo:add {name:x,", "n:4}"]).with_session(session);
    repl.run().unwrap();
    assert_eq!(repl.session().host().counter("x"), 4);
}

#[test]
fn aborts_and_bad_directives_count_as_failures() {
    let session = Session::new();
    session.load_function("demo:loop", "function demo:loop").unwrap();
    let mut repl = repl(&[":limits command 10", ":run demo:loop", ":bogus", "say fine"]).with_session(session);
    repl.run().unwrap();
    assert_eq!(repl.session().execution_config().command_limit, 10);
    assert_eq!(repl.failures(), 2);
}

#[test]
fn directives_report_state() {
    let mut repl = repl(&[]);
    repl.session().load_function("demo:a", "say a").unwrap();
    assert_eq!(repl.eval(":functions").unwrap(), "demo:a");
    assert_eq!(repl.eval(":limits fork 4").unwrap(), "command 65536, fork 4, queue 65536");
    assert_eq!(repl.eval(":trace on").unwrap(), "tracing on");

    let output = repl.eval("function demo:a").unwrap();
    assert!(output.contains("[console] a"));
    assert!(repl.eval(":trace").unwrap().contains("demo:a"));
    assert!(repl.eval(":trace json").unwrap().contains("\"type\""));
}

#[test]
fn script_files_load_and_run_functions() {
    let root = std::env::temp_dir().join(format!("cascade-it-script-{}", std::process::id()));
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(root.join("data/demo")).unwrap();
    fs::write(root.join("data/demo/bump.mcfunction"), "counter add hits 1\nsay bumped").unwrap();
    let script = root.join("setup.cascade");
    fs::write(
        &script,
        format!(
            "# setup\n:load {}\n\n:run demo:bump\nexecute as a,b \\\n  run function demo:bump\n:quit\n:run demo:bump\n",
            root.join("data").display()
        ),
    )
    .unwrap();

    let mut repl = repl(&[]);
    repl.eval_file(&script).unwrap();
    fs::remove_dir_all(&root).unwrap();

    assert_eq!(repl.session().host().counter("hits"), 3);
    assert_eq!(repl.failures(), 0);
}
