//! Cross-layer integration tests for Cascade
//!
//! Tests that drive sessions, config files, and the REPL over the full stack.

mod config;
mod repl;
mod session;
