//! Tracing of command execution.
//!
//! A [`Tracer`] plugs into an execution context as its trace callbacks and
//! records every command, return, call, and reported error. Records are kept
//! in a ring buffer and grouped by run; the session marks run boundaries.
//!
//! # Example
//!
//! ```text
//! > :trace on
//! > function demo:greet
//! R0001 === RUN 1 START ===
//! R0001   CALL demo:greet (2 entries)
//! R0001     > say hello
//! R0001     < say hello = 1
//! ```

pub mod buffer;
pub mod format;
pub mod record;

pub use buffer::TraceBuffer;
pub use format::{HumanFormatter, JsonFormatter, TraceFormatter};
pub use record::{TraceEvent, TraceRecord};

use std::io::{self, Write};
use std::time::Instant;

use cascade_engine::TraceCallbacks;

use crate::config::ObservabilityConfig;

// =============================================================================
// Trace Output
// =============================================================================

/// Where records are echoed as they are recorded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraceOutput {
    /// Buffer only.
    #[default]
    None,
    /// Also write each record to stderr.
    Stderr,
}

// =============================================================================
// Tracer Configuration
// =============================================================================

/// Configuration for a [`Tracer`].
#[derive(Clone, Debug)]
pub struct TracerConfig {
    /// Whether events are recorded.
    pub enabled: bool,
    /// Records kept in the buffer.
    pub buffer_size: usize,
    /// Echo destination.
    pub output: TraceOutput,
    /// Format with [`JsonFormatter`] instead of [`HumanFormatter`].
    pub json_format: bool,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            buffer_size: 10_000,
            output: TraceOutput::None,
            json_format: false,
        }
    }
}

impl TracerConfig {
    /// Creates a disabled configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives a tracer configuration from the observability switches.
    #[must_use]
    pub fn from_observability(config: &ObservabilityConfig) -> Self {
        Self {
            enabled: config.enabled,
            buffer_size: config.buffer_size,
            output: if config.trace_to_stderr {
                TraceOutput::Stderr
            } else {
                TraceOutput::None
            },
            json_format: config.json_output,
        }
    }

    /// Enables recording.
    #[must_use]
    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// Sets the buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Echoes records to stderr.
    #[must_use]
    pub fn to_stderr(mut self) -> Self {
        self.output = TraceOutput::Stderr;
        self
    }

    /// Uses JSON format.
    #[must_use]
    pub fn json(mut self) -> Self {
        self.json_format = true;
        self
    }
}

// =============================================================================
// Tracer
// =============================================================================

/// Records execution events.
///
/// When disabled, [`Tracer::record`] returns before touching the buffer.
pub struct Tracer {
    config: TracerConfig,
    buffer: TraceBuffer,
    current_run: u64,
    start_time: Instant,
    human_formatter: HumanFormatter,
    json_formatter: JsonFormatter,
}

impl Tracer {
    /// Creates a tracer.
    #[must_use]
    pub fn new(config: TracerConfig) -> Self {
        let buffer_size = config.buffer_size;
        Self {
            config,
            buffer: TraceBuffer::new(buffer_size),
            current_run: 0,
            start_time: Instant::now(),
            human_formatter: HumanFormatter::new(),
            json_formatter: JsonFormatter::new(),
        }
    }

    /// Creates a disabled tracer.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(TracerConfig::default())
    }

    /// Creates an enabled tracer that echoes to stderr.
    #[must_use]
    pub fn to_stderr() -> Self {
        Self::new(TracerConfig::new().enabled().to_stderr())
    }

    /// Returns whether events are recorded.
    #[must_use]
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Enables recording.
    pub fn enable(&mut self) {
        self.config.enabled = true;
    }

    /// Disables recording.
    pub fn disable(&mut self) {
        self.config.enabled = false;
    }

    /// Sets JSON formatting.
    pub fn set_json_format(&mut self, json: bool) {
        self.config.json_format = json;
    }

    /// Returns the current run number. Zero before the first run.
    #[must_use]
    pub fn current_run(&self) -> u64 {
        self.current_run
    }

    /// Records an event in the current run.
    #[inline]
    pub fn record(&mut self, event: TraceEvent) {
        if !self.config.enabled {
            return;
        }
        let timestamp_ns = u64::try_from(self.start_time.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.buffer.push(self.current_run, timestamp_ns, event);

        if self.config.output == TraceOutput::Stderr {
            if let Some(record) = self.buffer.last() {
                let line = self.format_record(record);
                let _ = writeln!(io::stderr(), "{line}");
            }
        }
    }

    /// Formats a record with the configured formatter.
    #[must_use]
    pub fn format_record(&self, record: &TraceRecord) -> String {
        if self.config.json_format {
            self.json_formatter.format(record)
        } else {
            self.human_formatter.format(record)
        }
    }

    /// Formats several records with the configured formatter.
    #[must_use]
    pub fn format_records(&self, records: &[&TraceRecord]) -> String {
        if self.config.json_format {
            self.json_formatter.format_many(records)
        } else {
            self.human_formatter.format_many(records)
        }
    }

    /// Returns the buffer.
    #[must_use]
    pub fn buffer(&self) -> &TraceBuffer {
        &self.buffer
    }

    /// Clears the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    // -------------------------------------------------------------------------
    // Run boundaries
    // -------------------------------------------------------------------------

    /// Starts a new run and records its start.
    pub fn run_start(&mut self) {
        self.current_run += 1;
        self.record(TraceEvent::RunStart);
    }

    /// Records the end of the current run.
    pub fn run_end(&mut self, success: bool, cost: usize) {
        self.record(TraceEvent::RunEnd { success, cost });
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::disabled()
    }
}

impl TraceCallbacks for Tracer {
    fn on_command(&mut self, depth: usize, command: &str) {
        self.record(TraceEvent::Command {
            depth,
            command: command.to_string(),
        });
    }

    fn on_return(&mut self, depth: usize, command: &str, result: i32) {
        self.record(TraceEvent::Return {
            depth,
            command: command.to_string(),
            result,
        });
    }

    fn on_call(&mut self, depth: usize, function: &str, size: usize) {
        self.record(TraceEvent::Call {
            depth,
            function: function.to_string(),
            size,
        });
    }

    fn on_error(&mut self, message: &str) {
        self.record(TraceEvent::Error {
            message: message.to_string(),
        });
    }
}

// =============================================================================
// Tests
// =============================================================================
