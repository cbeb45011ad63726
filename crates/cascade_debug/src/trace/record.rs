//! Trace records and events.

/// Something the engine did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceEvent {
    /// A run began.
    RunStart,
    /// A run finished.
    RunEnd {
        /// Whether the run completed without hitting a limit.
        success: bool,
        /// Commands charged during the run.
        cost: usize,
    },
    /// A command is about to execute.
    Command {
        /// Frame depth.
        depth: usize,
        /// The command text.
        command: String,
    },
    /// A command returned.
    Return {
        /// Frame depth.
        depth: usize,
        /// The command text.
        command: String,
        /// Its result.
        result: i32,
    },
    /// A function was called.
    Call {
        /// Depth of the calling frame.
        depth: usize,
        /// Function id.
        function: String,
        /// Number of entries in the body.
        size: usize,
    },
    /// A command reported an error.
    Error {
        /// The rendered error.
        message: String,
    },
}

impl TraceEvent {
    /// Returns the event type name, used for filtering.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            TraceEvent::RunStart => "run-start",
            TraceEvent::RunEnd { .. } => "run-end",
            TraceEvent::Command { .. } => "command",
            TraceEvent::Return { .. } => "return",
            TraceEvent::Call { .. } => "call",
            TraceEvent::Error { .. } => "error",
        }
    }
}

/// A recorded event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    /// Sequence number, unique per tracer.
    pub id: u64,
    /// Run the event belongs to.
    pub run: u64,
    /// Nanoseconds since the tracer was created.
    pub timestamp_ns: u64,
    /// The event.
    pub event: TraceEvent,
}

impl TraceRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(id: u64, run: u64, timestamp_ns: u64, event: TraceEvent) -> Self {
        Self {
            id,
            run,
            timestamp_ns,
            event,
        }
    }

    /// Returns the event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }
}
