//! Integration tests for Layer 2: Engine
//!
//! Tests for the run queue, the continuation scheduler, frames, limits, and
//! diagnostic hooks, driven through the reference command set.

mod diagnostics;
mod frames;
mod limits;
mod scheduler;
