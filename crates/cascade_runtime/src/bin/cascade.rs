//! Cascade CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use cascade_runtime::{Repl, RuntimeConfig, Session};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cascade")]
#[command(about = "Run command functions on a trampolined execution engine")]
#[command(version)]
struct Cli {
    /// Script files of commands and directives, evaluated in order
    files: Vec<PathBuf>,

    /// Exit after running files, commands, and functions
    #[arg(short, long)]
    batch: bool,

    /// JSON config file with `execution` and `observability` sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of function files to load
    #[arg(short, long)]
    functions: Option<PathBuf>,

    /// Command to run (repeatable)
    #[arg(short = 'e', long = "execute")]
    commands: Vec<String>,

    /// Function to run (repeatable)
    #[arg(short, long = "run")]
    run: Vec<String>,

    /// Maximum cost units per run
    #[arg(long)]
    command_limit: Option<usize>,

    /// Maximum sources per redirect step
    #[arg(long)]
    fork_limit: Option<usize>,

    /// Maximum pending queue entries
    #[arg(long)]
    queue_limit: Option<usize>,

    /// Trace runs to stderr
    #[arg(long)]
    trace: bool,

    /// Trace as JSON lines
    #[arg(long, requires = "trace")]
    json: bool,

    /// Profile runs and print timings on exit
    #[arg(long)]
    profile: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn runtime_config(cli: &Cli) -> cascade_foundation::Result<RuntimeConfig> {
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };

    if let Some(limit) = cli.command_limit {
        config.execution.command_limit = limit;
    }
    if let Some(limit) = cli.fork_limit {
        config.execution.fork_limit = limit;
    }
    if let Some(limit) = cli.queue_limit {
        config.execution.queue_limit = limit;
    }
    if cli.trace {
        config.observability.enabled = true;
        config.observability.trace_to_stderr = true;
        config.observability.json_output = cli.json;
    }
    if cli.profile {
        config.observability.profiling = true;
    }
    if let Some(functions) = &cli.functions {
        config.functions = Some(functions.clone());
    }
    Ok(config)
}

fn run(cli: &Cli) -> cascade_foundation::Result<ExitCode> {
    let config = runtime_config(cli)?;
    let session = Session::with_config(&config);

    if let Some(dir) = &config.functions {
        let report = session.load_directory(dir)?;
        for err in &report.errors {
            eprintln!("\x1b[33mWarning: {err}\x1b[0m");
        }
    }

    let mut repl = Repl::new()?.with_session(session);

    for file in &cli.files {
        repl.eval_file(file)?;
    }
    for command in &cli.commands {
        repl.eval_and_print(command);
    }
    for id in &cli.run {
        repl.eval_and_print(&format!(":run {id}"));
    }

    if cli.batch {
        if cli.profile {
            eprintln!("{}", repl.session().profiler().format_report(20));
        }
        return Ok(if repl.failures() == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let has_input = !cli.files.is_empty() || !cli.commands.is_empty() || !cli.run.is_empty();
    if has_input {
        repl = repl.without_banner();
    }
    repl.run()?;
    Ok(ExitCode::SUCCESS)
}
