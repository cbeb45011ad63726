//! Integration tests for Layer 1: Foundation
//!
//! Tests for errors, limits, messages, and macro argument values.

mod errors;
mod messages;
