//! Trace output formatters.
//!
//! Provides human-readable and JSON formatters for trace records.

use std::fmt::Write;

use serde_json::{Value, json};

use super::record::{TraceEvent, TraceRecord};

// =============================================================================
// Trace Formatter Trait
// =============================================================================

/// Formats trace records.
pub trait TraceFormatter {
    /// Formats a single record.
    fn format(&self, record: &TraceRecord) -> String;

    /// Formats several records, one per line.
    fn format_many(&self, records: &[&TraceRecord]) -> String {
        records
            .iter()
            .map(|r| self.format(r))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// =============================================================================
// Human-Readable Formatter
// =============================================================================

/// Formats records as indented text, one frame level per two spaces.
#[derive(Clone, Debug, Default)]
pub struct HumanFormatter {
    /// Include timestamps.
    pub show_timestamps: bool,
    /// Include record ids.
    pub show_ids: bool,
}

impl HumanFormatter {
    /// Creates a formatter with ids and timestamps hidden.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows timestamps.
    #[must_use]
    pub fn with_timestamps(mut self) -> Self {
        self.show_timestamps = true;
        self
    }

    /// Shows record ids.
    #[must_use]
    pub fn with_ids(mut self) -> Self {
        self.show_ids = true;
        self
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_timestamp(ns: u64) -> String {
        let us = ns / 1000;
        if us >= 1_000_000 {
            format!("{:.3}s", us as f64 / 1_000_000.0)
        } else if us >= 1000 {
            format!("{:.3}ms", us as f64 / 1000.0)
        } else {
            format!("{us}us")
        }
    }

    fn indent(depth: usize) -> String {
        "  ".repeat(depth + 1)
    }
}

impl TraceFormatter for HumanFormatter {
    fn format(&self, record: &TraceRecord) -> String {
        let mut prefix = String::new();
        if self.show_ids {
            let _ = write!(prefix, "[{:06}] ", record.id);
        }
        let _ = write!(prefix, "R{:04} ", record.run);
        if self.show_timestamps {
            let _ = write!(prefix, "{:>10} ", Self::format_timestamp(record.timestamp_ns));
        }

        let event = match &record.event {
            TraceEvent::RunStart => format!("=== RUN {} START ===", record.run),
            TraceEvent::RunEnd { success, cost } => {
                let status = if *success { "OK" } else { "ABORTED" };
                format!("=== RUN {} END ({status}, cost {cost}) ===", record.run)
            }
            TraceEvent::Command { depth, command } => format!("{}> {command}", Self::indent(*depth)),
            TraceEvent::Return { depth, command, result } => {
                format!("{}< {command} = {result}", Self::indent(*depth))
            }
            TraceEvent::Call { depth, function, size } => {
                let noun = if *size == 1 { "entry" } else { "entries" };
                format!("{}CALL {function} ({size} {noun})", Self::indent(*depth))
            }
            TraceEvent::Error { message } => format!("  ERROR {message}"),
        };

        prefix + &event
    }
}

// =============================================================================
// JSON Formatter
// =============================================================================

/// Formats records as JSON objects, one per line.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Creates a formatter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Builds the JSON value for a record.
    #[must_use]
    pub fn to_value(record: &TraceRecord) -> Value {
        let mut value = json!({
            "id": record.id,
            "run": record.run,
            "timestamp_ns": record.timestamp_ns,
            "type": record.event_type(),
        });
        let fields = match &record.event {
            TraceEvent::RunStart => json!({}),
            TraceEvent::RunEnd { success, cost } => json!({ "success": success, "cost": cost }),
            TraceEvent::Command { depth, command } => json!({ "depth": depth, "command": command }),
            TraceEvent::Return { depth, command, result } => {
                json!({ "depth": depth, "command": command, "result": result })
            }
            TraceEvent::Call { depth, function, size } => {
                json!({ "depth": depth, "function": function, "size": size })
            }
            TraceEvent::Error { message } => json!({ "message": message }),
        };
        if let (Some(target), Value::Object(fields)) = (value.as_object_mut(), fields) {
            target.extend(fields);
        }
        value
    }
}

impl TraceFormatter for JsonFormatter {
    fn format(&self, record: &TraceRecord) -> String {
        Self::to_value(record).to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================
