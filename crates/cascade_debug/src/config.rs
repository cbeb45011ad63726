//! Observability configuration.
//!
//! Controls whether runs are traced and profiled, and how trace records are
//! kept and echoed.

/// Switches for tracing and profiling.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ObservabilityConfig {
    /// Master switch for tracing.
    pub enabled: bool,
    /// Trace records kept in the ring buffer.
    pub buffer_size: usize,
    /// Echo each record to stderr as it is recorded.
    pub trace_to_stderr: bool,
    /// Format echoed and dumped records as JSON lines.
    pub json_output: bool,
    /// Collect per-section timings.
    pub profiling: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            buffer_size: 10_000,
            trace_to_stderr: false,
            json_output: false,
            profiling: false,
        }
    }
}

impl ObservabilityConfig {
    /// Creates a config with tracing off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config with tracing on.
    #[must_use]
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Tracing and profiling on, records echoed to stderr.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            enabled: true,
            trace_to_stderr: true,
            profiling: true,
            ..Self::default()
        }
    }

    /// Sets the master switch.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the ring buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Sets stderr echo.
    #[must_use]
    pub fn with_trace_to_stderr(mut self, enabled: bool) -> Self {
        self.trace_to_stderr = enabled;
        self
    }

    /// Sets JSON output.
    #[must_use]
    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.json_output = enabled;
        self
    }

    /// Sets profiling.
    #[must_use]
    pub fn with_profiling(mut self, enabled: bool) -> Self {
        self.profiling = enabled;
        self
    }

    /// Returns true if anything would be collected.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled || self.profiling
    }
}
