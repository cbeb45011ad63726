//! Reference command set, command source, and function library for Cascade.
//!
//! This crate provides:
//! - [`StandardDispatcher`] - `say`, `counter`, `fail`, `execute`, `return`, `function`, `trigger`
//! - [`ScriptSource`] - A named, permissioned source bound to a [`Host`]
//! - [`Host`] - Counters, output, and the [`FunctionLibrary`]
//! - [`parse_compound`] - Typed arguments for macro function calls

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod commands;
pub mod host;
pub mod library;
pub mod reader;
pub mod snbt;
pub mod source;

pub use commands::{GAMEMASTER_LEVEL, StandardDispatcher};
pub use host::{Host, OutputLine};
pub use library::{
    DEFAULT_NAMESPACE, FUNCTION_EXTENSION, FunctionLibrary, LoadReport, load_directory, load_lines, load_str,
    normalize_id,
};
pub use reader::Reader;
pub use snbt::{SnbtError, parse_compound};
pub use source::ScriptSource;
