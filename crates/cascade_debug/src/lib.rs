//! Tracing and profiling for Cascade runs.
//!
//! This crate provides:
//! - [`Tracer`] - Records engine events into a ring buffer, optionally echoing them
//! - [`SectionProfiler`] - Call counts and cumulative time per profiled section
//! - [`ObservabilityConfig`] - Switches for both

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod profile;
pub mod trace;

pub use config::ObservabilityConfig;
pub use profile::{SectionProfiler, SectionStats};
pub use trace::{
    HumanFormatter, JsonFormatter, TraceBuffer, TraceEvent, TraceFormatter, TraceOutput,
    TraceRecord, Tracer, TracerConfig,
};
