//! Errors, limits, translatable messages, and argument values for Cascade.
//!
//! This crate provides:
//! - [`Error`] - Rich error types for compilation, instantiation, and run aborts
//! - [`SemanticLimit`] - Kill switches that stop a run
//! - [`Message`] and [`CommandError`] - Structured, translatable command failures
//! - [`ArgValue`] and [`ArgRecord`] - Structured macro arguments

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod message;
pub mod value;

pub use error::{Error, ErrorContext, ErrorKind, LinePrefixHint, SemanticLimit};
pub use message::{CommandError, CommandResult, Message};
pub use value::{ArgRecord, ArgValue, format_decimal};

/// Result type for Cascade operations.
pub type Result<T> = std::result::Result<T, Error>;
