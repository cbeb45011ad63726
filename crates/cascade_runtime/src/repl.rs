//! The interactive command loop.
//!
//! Lines are run as console commands. Lines starting with `:` are directives:
//!
//! | Directive | Effect |
//! |-----------|--------|
//! | `:load <dir>` | Load every function file under `dir` |
//! | `:run <id> [<args>]` | Run a function, with macro arguments as a compound |
//! | `:functions` | List loaded function ids |
//! | `:trace on\|off\|show\|json` | Toggle tracing or dump the last run |
//! | `:profile on\|off\|show\|reset` | Toggle profiling or show timings |
//! | `:limits [command\|fork\|queue <n>]` | Show or change run limits |
//! | `:help` | List directives |
//! | `:quit` | Leave the loop |

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use cascade_debug::{JsonFormatter, TraceFormatter};
use cascade_foundation::{Error, ErrorKind, Result};
use cascade_stdlib::OutputLine;
use thiserror::Error as ThisError;

use crate::editor::{LineEditor, ReadResult, RustylineEditor, default_keywords, is_complete};
use crate::session::{RunReport, Session};

// =============================================================================
// Directives
// =============================================================================

/// A `:` directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    /// `:load <dir>`
    Load(String),
    /// `:run <id> [<args>]`
    Run {
        /// Function id.
        id: String,
        /// Macro arguments compound.
        arguments: Option<String>,
    },
    /// `:functions`
    Functions,
    /// `:trace <mode>`
    Trace(TraceMode),
    /// `:profile <mode>`
    Profile(ProfileMode),
    /// `:limits`, optionally setting one limit.
    Limits(Option<(LimitKind, usize)>),
    /// `:help`
    Help,
    /// `:quit`
    Quit,
}

/// Argument of `:trace`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceMode {
    /// Trace later runs.
    On,
    /// Stop tracing.
    Off,
    /// Print the last run's records.
    Show,
    /// Print the last run's records as JSON.
    Json,
}

/// Argument of `:profile`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileMode {
    /// Profile later runs.
    On,
    /// Stop profiling.
    Off,
    /// Print collected timings.
    Show,
    /// Discard collected timings.
    Reset,
}

/// A limit settable with `:limits`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimitKind {
    /// Cost ceiling.
    Command,
    /// Sources per redirect step.
    Fork,
    /// Pending queue entries.
    Queue,
}

/// A malformed directive.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum DirectiveError {
    /// The directive name is not known.
    #[error("unknown directive :{0} (try :help)")]
    Unknown(String),

    /// A required argument is absent.
    #[error(":{directive} requires {argument}")]
    MissingArgument {
        /// Directive name.
        directive: &'static str,
        /// What was expected.
        argument: &'static str,
    },

    /// An argument is not one of the accepted values.
    #[error("invalid argument to :{directive}: {value}")]
    InvalidArgument {
        /// Directive name.
        directive: &'static str,
        /// The offending text.
        value: String,
    },
}

impl From<DirectiveError> for Error {
    fn from(err: DirectiveError) -> Self {
        Error::internal(err.to_string())
    }
}

impl Directive {
    /// Parses a directive. Returns `Ok(None)` if `input` is not one.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectiveError`] if the directive is unknown or malformed.
    pub fn parse(input: &str) -> std::result::Result<Option<Self>, DirectiveError> {
        let Some(body) = input.trim().strip_prefix(':') else {
            return Ok(None);
        };
        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body, ""),
        };

        let directive = match name {
            "load" => {
                if rest.is_empty() {
                    return Err(DirectiveError::MissingArgument {
                        directive: "load",
                        argument: "a directory",
                    });
                }
                Self::Load(rest.to_string())
            }
            "run" => {
                let (id, arguments) = match rest.split_once(char::is_whitespace) {
                    Some((id, args)) => (id, Some(args.trim().to_string())),
                    None => (rest, None),
                };
                if id.is_empty() {
                    return Err(DirectiveError::MissingArgument {
                        directive: "run",
                        argument: "a function id",
                    });
                }
                Self::Run {
                    id: id.to_string(),
                    arguments,
                }
            }
            "functions" => Self::Functions,
            "trace" => Self::Trace(match rest {
                "" | "show" => TraceMode::Show,
                "on" => TraceMode::On,
                "off" => TraceMode::Off,
                "json" => TraceMode::Json,
                other => return Err(invalid("trace", other)),
            }),
            "profile" => Self::Profile(match rest {
                "" | "show" => ProfileMode::Show,
                "on" => ProfileMode::On,
                "off" => ProfileMode::Off,
                "reset" => ProfileMode::Reset,
                other => return Err(invalid("profile", other)),
            }),
            "limits" => Self::Limits(parse_limit(rest)?),
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => return Err(DirectiveError::Unknown(other.to_string())),
        };
        Ok(Some(directive))
    }
}

fn invalid(directive: &'static str, value: &str) -> DirectiveError {
    DirectiveError::InvalidArgument {
        directive,
        value: value.to_string(),
    }
}

fn parse_limit(rest: &str) -> std::result::Result<Option<(LimitKind, usize)>, DirectiveError> {
    if rest.is_empty() {
        return Ok(None);
    }
    let mut words = rest.split_whitespace();
    let kind = match words.next() {
        Some("command") => LimitKind::Command,
        Some("fork") => LimitKind::Fork,
        Some("queue") => LimitKind::Queue,
        Some(other) => return Err(invalid("limits", other)),
        None => return Ok(None),
    };
    let value = words.next().ok_or(DirectiveError::MissingArgument {
        directive: "limits",
        argument: "a number",
    })?;
    let value = value.parse().map_err(|_| invalid("limits", value))?;
    if let Some(extra) = words.next() {
        return Err(invalid("limits", extra));
    }
    Ok(Some((kind, value)))
}

const HELP: &str = "\
Commands run as the console. Directives:
  :load <dir>                      load function files
  :run <id> [<args>]               run a function
  :functions                       list loaded functions
  :trace on|off|show|json          trace runs
  :profile on|off|show|reset       profile runs
  :limits [command|fork|queue <n>] show or set limits
  :help                            this text
  :quit                            leave";

// =============================================================================
// REPL
// =============================================================================

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    editor: E,
    session: Session,
    show_banner: bool,
    prompt: String,
    continuation_prompt: String,
    failures: usize,
}

impl Repl<RustylineEditor> {
    /// Creates a REPL with the rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new() -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a REPL with the given editor.
    pub fn with_editor(editor: E) -> Self {
        Self {
            editor,
            session: Session::new(),
            show_banner: true,
            prompt: "> ".to_string(),
            continuation_prompt: "| ".to_string(),
            failures: 0,
        }
    }

    /// Sets the session.
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self.refresh_keywords();
        self
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the primary prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Returns the session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the session for modification.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Number of aborted runs and failed directives so far.
    #[must_use]
    pub const fn failures(&self) -> usize {
        self.failures
    }

    /// Runs the loop until `:quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }

        while self.read_eval_print()? {}

        println!("\nGoodbye!");
        Ok(())
    }

    /// Returns `Ok(false)` when the loop should end.
    fn read_eval_print(&mut self) -> Result<bool> {
        let Some(input) = self.read_input()? else {
            return Ok(false);
        };
        if input.trim().is_empty() {
            return Ok(true);
        }
        self.editor.add_history(&input);
        Ok(self.eval_and_print(&input))
    }

    /// Reads one logical line, joining continuation lines.
    fn read_input(&mut self) -> Result<Option<String>> {
        let mut input = match self.editor.read_line(&self.prompt)? {
            ReadResult::Line(line) => line,
            ReadResult::Interrupted => {
                println!();
                return Ok(Some(String::new()));
            }
            ReadResult::Eof => return Ok(None),
        };

        while !is_complete(&input) {
            match self.editor.read_continuation(&self.continuation_prompt)? {
                ReadResult::Line(line) => join_continuation(&mut input, &line),
                ReadResult::Interrupted => {
                    println!("\nInput cancelled.");
                    return Ok(Some(String::new()));
                }
                ReadResult::Eof => {
                    return Err(Error::internal("unexpected end of input after a continuation"));
                }
            }
        }
        Ok(Some(input))
    }

    /// Evaluates `input` and prints the result. Returns false on `:quit`.
    ///
    /// Evaluation errors are printed and counted rather than returned.
    pub fn eval_and_print(&mut self, input: &str) -> bool {
        if matches!(Directive::parse(input), Ok(Some(Directive::Quit))) {
            return false;
        }
        match self.eval(input) {
            Ok(text) => {
                if !text.is_empty() {
                    println!("{text}");
                }
            }
            Err(e) => {
                self.failures += 1;
                self.print_error(&e);
            }
        }
        true
    }

    /// Evaluates one command or directive and returns the text to print.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed directives and unreadable directories.
    pub fn eval(&mut self, input: &str) -> Result<String> {
        let Some(directive) = Directive::parse(input)? else {
            let report = self.session.run_command(input.trim());
            return Ok(self.render_report(&report));
        };

        match directive {
            Directive::Load(path) => {
                let report = self.session.load_directory(Path::new(&path))?;
                self.refresh_keywords();
                let mut text = format!("loaded {} function(s) from {path}", report.loaded.len());
                for err in &report.errors {
                    self.failures += 1;
                    let _ = write!(text, "\n  {err}");
                }
                Ok(text)
            }
            Directive::Run { id, arguments } => {
                let report = self.session.run_function(&id, arguments.as_deref());
                Ok(self.render_report(&report))
            }
            Directive::Functions => Ok(self.session.function_ids().join("\n")),
            Directive::Trace(mode) => Ok(match mode {
                TraceMode::On => {
                    self.session.set_tracing(true);
                    "tracing on".to_string()
                }
                TraceMode::Off => {
                    self.session.set_tracing(false);
                    "tracing off".to_string()
                }
                TraceMode::Show => self.session.last_trace(),
                TraceMode::Json => {
                    let tracer = self.session.tracer();
                    let records = tracer.buffer().records_for_run(tracer.current_run());
                    JsonFormatter::new().format_many(&records)
                }
            }),
            Directive::Profile(mode) => Ok(match mode {
                ProfileMode::On => {
                    self.session.set_profiling(true);
                    "profiling on".to_string()
                }
                ProfileMode::Off => {
                    self.session.set_profiling(false);
                    "profiling off".to_string()
                }
                ProfileMode::Show => self.session.profiler().format_report(20),
                ProfileMode::Reset => {
                    self.session.reset_profile();
                    "profile reset".to_string()
                }
            }),
            Directive::Limits(change) => {
                if let Some((kind, value)) = change {
                    let config = self.session.execution_config().clone();
                    let config = match kind {
                        LimitKind::Command => config.with_command_limit(value),
                        LimitKind::Fork => config.with_fork_limit(value),
                        LimitKind::Queue => config.with_queue_limit(value),
                    };
                    self.session.set_execution_config(config);
                }
                let config = self.session.execution_config();
                Ok(format!(
                    "command {}, fork {}, queue {}",
                    config.command_limit, config.fork_limit, config.queue_limit
                ))
            }
            Directive::Help => Ok(HELP.to_string()),
            Directive::Quit => Ok(String::new()),
        }
    }

    /// Evaluates every line of a script file.
    ///
    /// Blank lines and lines starting with `#` are skipped; continuation
    /// lines are joined as at the prompt. Evaluation stops at `:quit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn eval_file(&mut self, path: &Path) -> Result<()> {
        let source = fs::read_to_string(path)
            .map_err(|e| Error::new(ErrorKind::Io(format!("failed to read {}: {e}", path.display()))))?;

        let mut pending = String::new();
        for line in source.lines() {
            if pending.is_empty() {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    continue;
                }
                pending.push_str(line);
            } else {
                join_continuation(&mut pending, line);
            }
            if is_complete(&pending) {
                let input = std::mem::take(&mut pending);
                if !self.eval_and_print(&input) {
                    return Ok(());
                }
            }
        }
        if !pending.is_empty() {
            self.failures += 1;
            self.print_error(&Error::internal(format!(
                "{}: unexpected end of file after a continuation",
                path.display()
            )));
        }
        Ok(())
    }

    fn render_report(&mut self, report: &RunReport) -> String {
        let mut lines: Vec<String> = report
            .output
            .iter()
            .map(|line| match line {
                OutputLine::Message { .. } => line.to_string(),
                OutputLine::Failure { .. } => format!("\x1b[31m{line}\x1b[0m"),
            })
            .collect();
        if let Some(abort) = &report.abort {
            self.failures += 1;
            lines.push(format!("\x1b[31maborted: {abort}\x1b[0m"));
        }
        if let Some(outcome) = report.outcome {
            lines.push(format!("\x1b[1m=> {outcome}\x1b[0m"));
        }
        lines.join("\n")
    }

    fn refresh_keywords(&mut self) {
        let mut keywords = default_keywords();
        keywords.extend(self.session.function_ids());
        self.editor.set_keywords(keywords);
    }

    #[allow(clippy::unused_self)]
    fn print_error(&self, error: &Error) {
        eprintln!("\x1b[31mError: {error}\x1b[0m");
    }

    #[allow(clippy::unused_self)]
    fn print_banner(&self) {
        println!("\x1b[1;36mCascade\x1b[0m v{}", env!("CARGO_PKG_VERSION"));
        println!("Type commands to run them as the console. :help lists directives, Ctrl+D exits.\n");
        let _ = io::stdout().flush();
    }
}

/// Appends a continuation line: a trailing backslash is dropped and the next
/// line's indentation is stripped; otherwise the lines are joined by a space.
fn join_continuation(input: &mut String, line: &str) {
    let trimmed_len = input.trim_end().len();
    input.truncate(trimmed_len);
    if input.ends_with('\\') {
        input.pop();
    } else {
        input.push(' ');
    }
    input.push_str(line.trim_start());
}
