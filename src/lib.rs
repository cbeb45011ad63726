//! Cascade - Trampolined command-function execution
//!
//! This crate re-exports all layers of the Cascade system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 4: cascade_runtime    — REPL, CLI, session, config files
//! Layer 3: cascade_stdlib     — Reference command set, function library
//!          cascade_debug      — Tracing, profiling
//! Layer 2: cascade_engine     — Run queue, frames, chains, function calls
//! Layer 1: cascade_foundation — Errors, limits, messages, argument values
//! ```

pub use cascade_debug as debug;
pub use cascade_engine as engine;
pub use cascade_foundation as foundation;
pub use cascade_runtime as runtime;
pub use cascade_stdlib as stdlib;
