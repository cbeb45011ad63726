//! REPL, CLI, and session management for Cascade.
//!
//! This crate provides:
//! - [`Session`] - A host, limits, and diagnostics shared across runs
//! - [`RuntimeConfig`] - Execution and observability settings loaded from JSON
//! - [`Repl`] - Interactive command loop with `:` directives
//! - [`LineEditor`] - Line input abstraction, backed by rustyline

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod editor;
pub mod repl;
pub mod session;

pub use config::RuntimeConfig;
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use repl::{Directive, DirectiveError, LimitKind, ProfileMode, Repl, TraceMode};
pub use session::{Outcome, RunReport, Session};
