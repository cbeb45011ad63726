//! Trampolined command execution for Cascade.
//!
//! This crate provides:
//! - [`ExecutionContext`] - run queue, cost budget, and frame governors
//! - [`schedule`] - N-way fan-out without native recursion
//! - [`CommandChain`] and [`CommandDispatcher`] - The parser boundary
//! - [`CallFunction`] and [`IsolatedCall`] - New frames for function bodies
//! - [`CommandFunction`] - Compiled function files, including macro functions
//!
//! Nothing in the engine recurses on the host stack. A command chain, a
//! function body, or a fork all become further entries on one queue, so a
//! function may call itself a hundred thousand levels deep; the cost budget is
//! what stops a run that never ends.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod action;
pub mod build;
pub mod call;
pub mod callback;
pub mod chain;
pub mod config;
pub mod context;
pub mod continuation;
pub mod diagnostics;
pub mod execute;
pub mod frame;
pub mod function;
pub mod source;

#[cfg(test)]
mod test_support;

pub use action::{EntryAction, FallthroughTask, QueueEntry, UnboundEntryAction, bind, from_fn};
pub use build::{ContinuationCommand, TopLevelCommand, UnboundCommand};
pub use call::{CallFunction, IsolatedCall, IsolatedTask};
pub use callback::ResultCallback;
pub use chain::{
    ChainModifiers, CommandChain, CommandDispatcher, CustomCommandExecutor, CustomModifierExecutor,
    Executable, ParsedCommand, Redirect, Stage, parse_command,
};
pub use config::ExecutionConfig;
pub use context::{ExecutionContext, ExecutionControl, RunSummary};
pub use continuation::{ContinuationTask, schedule};
pub use diagnostics::{NoopProfiler, Profiler, TraceCallbacks};
pub use execute::ExecuteCommand;
pub use frame::{Frame, FrameControl};
pub use function::{
    CommandFunction, FunctionId, InstantiatedFunction, MAX_COMMAND_LENGTH, MacroEntry, MacroFunction,
    StringTemplate, TemplateError,
};
pub use source::ExecutionSource;
