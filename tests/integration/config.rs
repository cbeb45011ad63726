//! Tests for config files driving sessions

use std::fs;
use std::path::PathBuf;

use cascade_foundation::{ErrorKind, SemanticLimit};
use cascade_runtime::{RuntimeConfig, Session};

struct Workspace(PathBuf);

impl Workspace {
    fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!("cascade-it-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        Self(root)
    }

    fn write(&self, path: &str, text: &str) -> PathBuf {
        let path = self.0.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, text).unwrap();
        path
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

#[test]
fn config_file_sets_limits_and_functions() {
    let workspace = Workspace::new("config");
    workspace.write("data/demo/loop.mcfunction", "function demo:loop");
    let path = workspace.write(
        "cascade.json",
        r#"{ "execution": { "command_limit": 40 }, "functions": "data" }"#,
    );

    let config = RuntimeConfig::load(&path).unwrap();
    let session = Session::with_config(&config);
    assert_eq!(session.execution_config().command_limit, 40);

    let report = session.load_directory(config.functions.as_deref().unwrap()).unwrap();
    assert_eq!(report.loaded.len(), 1);

    let report = session.run_function("demo:loop", None);
    let abort = report.abort.unwrap();
    assert!(matches!(abort.kind, ErrorKind::LimitExceeded(SemanticLimit::CommandCost { limit: 40 })));
    assert_eq!(report.cost, 40);
}

#[test]
fn observability_section_enables_tracing() {
    let config = RuntimeConfig::from_json(r#"{ "observability": { "enabled": true, "profiling": true } }"#).unwrap();
    let session = Session::with_config(&config);
    session.run_command("say traced");

    assert!(session.last_trace().contains("say traced"));
    assert!(session.profiler().get("execute say traced").is_some());
}

#[test]
fn invalid_config_files_name_the_file() {
    let workspace = Workspace::new("invalid");
    let path = workspace.write("bad.json", r#"{ "execution": { "command_limit": "lots" } }"#);

    let err = RuntimeConfig::load(&path).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Config(_)));
    let source = err.context.and_then(|context| context.source).unwrap();
    assert!(source.ends_with("bad.json"));
}
