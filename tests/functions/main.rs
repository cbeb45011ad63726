//! Function compilation and loading tests
//!
//! Tests for compiling function text, instantiating macro functions through
//! their cache, and loading libraries from disk.

mod compilation;
mod macros;
