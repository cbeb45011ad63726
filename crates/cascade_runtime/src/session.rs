//! Session state shared by the REPL and the CLI.
//!
//! A session owns one [`Host`] and runs every submission in a fresh
//! [`ExecutionContext`], so a `return` in one submission cannot discard work
//! queued by another. Tracing and profiling handles live across runs; the
//! tracer numbers each run so its records can be dumped per submission.

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use cascade_debug::{ObservabilityConfig, SectionProfiler, Tracer, TracerConfig};
use cascade_engine::{ExecutionConfig, ExecutionContext, ExecutionSource, FunctionId, ResultCallback, parse_command};
use cascade_foundation::message::UNKNOWN_FUNCTION;
use cascade_foundation::{ArgRecord, CommandError, CommandResult, Error, Message, Result};
use cascade_stdlib::{Host, LoadReport, OutputLine, Reader, ScriptSource, load_directory, load_str, normalize_id, parse_compound};
use tracing::{debug, info};

use crate::config::RuntimeConfig;

// =============================================================================
// Run Reports
// =============================================================================

/// The last result reported to the console during a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Whether the reporting command succeeded.
    pub success: bool,
    /// The reported value.
    pub value: i32,
}

impl Outcome {
    /// A failed outcome.
    #[must_use]
    pub const fn failure() -> Self {
        Self {
            success: false,
            value: 0,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            write!(f, "{}", self.value)
        } else {
            write!(f, "failed")
        }
    }
}

/// What one submission did.
#[derive(Debug)]
pub struct RunReport {
    /// The last result reported to the console, if any.
    pub outcome: Option<Outcome>,
    /// Cost units charged.
    pub cost: usize,
    /// Deepest frame reached. Zero when the run aborted.
    pub max_depth: usize,
    /// Messages and failures produced, in order.
    pub output: Vec<OutputLine>,
    /// The error that aborted the run.
    pub abort: Option<Error>,
}

impl RunReport {
    /// Returns true if the run finished and the last reported result succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.abort.is_none() && self.outcome.is_none_or(|outcome| outcome.success)
    }

    fn rejected(output: Vec<OutputLine>) -> Self {
        Self {
            outcome: Some(Outcome::failure()),
            cost: 0,
            max_depth: 0,
            output,
            abort: None,
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// A host plus the limits and diagnostics applied to each run.
pub struct Session {
    host: Rc<Host>,
    execution: ExecutionConfig,
    observability: ObservabilityConfig,
    tracer: Rc<RefCell<Tracer>>,
    profiler: Rc<RefCell<SectionProfiler>>,
}

impl Session {
    /// Creates a session with default limits and diagnostics off.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&RuntimeConfig::default())
    }

    /// Creates a session from a runtime configuration.
    ///
    /// The `functions` directory is not loaded; see [`Session::load_directory`].
    #[must_use]
    pub fn with_config(config: &RuntimeConfig) -> Self {
        Self {
            host: Host::new(),
            execution: config.execution.clone(),
            observability: config.observability.clone(),
            tracer: Rc::new(RefCell::new(Tracer::new(TracerConfig::from_observability(
                &config.observability,
            )))),
            profiler: Rc::new(RefCell::new(SectionProfiler::new())),
        }
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &Rc<Host> {
        &self.host
    }

    /// Returns the limits applied to each run.
    #[must_use]
    pub fn execution_config(&self) -> &ExecutionConfig {
        &self.execution
    }

    /// Replaces the limits applied to later runs.
    pub fn set_execution_config(&mut self, config: ExecutionConfig) {
        self.execution = config;
    }

    /// Returns the observability switches.
    #[must_use]
    pub fn observability(&self) -> &ObservabilityConfig {
        &self.observability
    }

    /// Turns tracing of later runs on or off.
    pub fn set_tracing(&mut self, enabled: bool) {
        self.observability.enabled = enabled;
        let mut tracer = self.tracer.borrow_mut();
        if enabled {
            tracer.enable();
        } else {
            tracer.disable();
        }
    }

    /// Turns profiling of later runs on or off.
    pub fn set_profiling(&mut self, enabled: bool) {
        self.observability.profiling = enabled;
    }

    /// Returns the tracer.
    #[must_use]
    pub fn tracer(&self) -> Ref<'_, Tracer> {
        self.tracer.borrow()
    }

    /// Returns the profiler.
    #[must_use]
    pub fn profiler(&self) -> Ref<'_, SectionProfiler> {
        self.profiler.borrow()
    }

    /// Discards collected timings.
    pub fn reset_profile(&self) {
        self.profiler.borrow_mut().reset();
    }

    /// Formats the records of the most recent run.
    #[must_use]
    pub fn last_trace(&self) -> String {
        let tracer = self.tracer.borrow();
        let records = tracer.buffer().records_for_run(tracer.current_run());
        tracer.format_records(&records)
    }

    // -------------------------------------------------------------------------
    // Functions
    // -------------------------------------------------------------------------

    /// Loads every function file under `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be read.
    pub fn load_directory(&self, path: &Path) -> Result<LoadReport> {
        let report = load_directory(&self.host, path)?;
        info!(
            path = %path.display(),
            loaded = report.loaded.len(),
            failed = report.errors.len(),
            "functions loaded"
        );
        Ok(report)
    }

    /// Compiles `text` as function `id`.
    ///
    /// # Errors
    ///
    /// Returns the compilation error.
    pub fn load_function(&self, id: &str, text: &str) -> Result<FunctionId> {
        load_str(&self.host, id, text)
    }

    /// Returns the ids of every loaded function, in order.
    #[must_use]
    pub fn function_ids(&self) -> Vec<String> {
        self.host.library().ids().map(str::to_string).collect()
    }

    // -------------------------------------------------------------------------
    // Running
    // -------------------------------------------------------------------------

    /// Parses and runs one command as the console.
    pub fn run_command(&self, input: &str) -> RunReport {
        let host = Rc::clone(&self.host);
        self.execute(input, move |context, console, callback| {
            let parsed = parse_command(host.dispatcher().as_ref(), &console, input)?;
            context.queue_initial_command_execution(&parsed, console, callback);
            Ok(())
        })
    }

    /// Runs function `id` as the console.
    ///
    /// `arguments` is a compound such as `{n:1}`, required by macro functions.
    pub fn run_function(&self, id: &str, arguments: Option<&str>) -> RunReport {
        let host = Rc::clone(&self.host);
        self.execute(id, move |context, console, callback| {
            let function = host.function(id).ok_or_else(|| {
                CommandError::new(Message::translatable(UNKNOWN_FUNCTION, vec![normalize_id(id)]))
            })?;
            let arguments = arguments.map(parse_arguments).transpose()?;
            let instance = function.instantiate(arguments.as_ref())?;
            context.queue_initial_function_call(instance, console, callback);
            Ok(())
        })
    }

    fn execute(
        &self,
        label: &str,
        queue: impl FnOnce(&mut ExecutionContext<ScriptSource>, ScriptSource, ResultCallback) -> CommandResult<()>,
    ) -> RunReport {
        let last = Rc::new(Cell::new(None));
        let sink = Rc::clone(&last);
        let callback = ResultCallback::new(move |success, value| sink.set(Some(Outcome { success, value })));
        let console = self.host.console().with_callback(callback.clone());

        let mut context = ExecutionContext::new(self.execution.clone());
        if self.observability.enabled {
            context = context.with_tracer(Rc::clone(&self.tracer));
        }
        if self.observability.profiling {
            context = context.with_profiler(Rc::clone(&self.profiler));
        }

        if let Err(err) = queue(&mut context, console.clone(), callback) {
            debug!(input = label, error = %err, "submission rejected");
            console.send_failure(&err);
            return RunReport::rejected(self.host.take_output());
        }

        self.tracer.borrow_mut().run_start();
        let result = context.run();
        let cost = context.cost();
        self.tracer.borrow_mut().run_end(result.is_ok(), cost);

        let (max_depth, abort) = match result {
            Ok(summary) => (summary.max_depth, None),
            Err(err) => (0, Some(err)),
        };
        debug!(input = label, cost, max_depth, aborted = abort.is_some(), "submission finished");
        RunReport {
            outcome: last.get(),
            cost,
            max_depth,
            output: self.host.take_output(),
            abort,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.host.clear_functions();
    }
}

/// Parses a macro argument compound such as `{name:"x", n:2}`.
fn parse_arguments(text: &str) -> CommandResult<ArgRecord> {
    let mut reader = Reader::new(text.trim());
    let record = parse_compound(&mut reader)?;
    reader.skip_whitespace();
    if reader.is_at_end() {
        Ok(record)
    } else {
        Err(reader.invalid())
    }
}
