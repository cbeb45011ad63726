//! Integration tests for Message and CommandError
//!
//! Tests translation fallbacks, argument substitution, and error positions.

use cascade_foundation::message::{MISSING_ARGUMENT, UNKNOWN_FUNCTION};
use cascade_foundation::{CommandError, Message};

// =============================================================================
// Messages
// =============================================================================

#[test]
fn known_keys_use_the_english_fallback() {
    let message = Message::translatable(MISSING_ARGUMENT, vec!["demo:add".into(), "n".into()]);
    assert_eq!(message.to_string(), "Function demo:add is missing argument n");
    assert_eq!(message.key(), MISSING_ARGUMENT);
    assert_eq!(message.args(), ["demo:add", "n"]);
}

#[test]
fn unknown_keys_render_the_key_and_arguments() {
    assert_eq!(Message::translatable("custom.key", vec![]).to_string(), "custom.key");
    assert_eq!(
        Message::translatable("custom.key", vec!["a".into(), "b".into()]).to_string(),
        "custom.key [a, b]"
    );
}

#[test]
fn literal_messages_render_verbatim() {
    assert_eq!(Message::literal("100% done").to_string(), "100% done");
}

#[test]
fn missing_arguments_render_empty() {
    let message = Message::translatable(UNKNOWN_FUNCTION, vec![]);
    assert_eq!(message.to_string(), "Unknown function ");
}

// =============================================================================
// Command Errors
// =============================================================================

#[test]
fn fork_limit_error() {
    let err = CommandError::fork_limit(2);
    assert!(err.is_fork_limit());
    assert_eq!(err.to_string(), "Maximum number of contexts (2) reached");
    assert!(!CommandError::invalid("x").is_fork_limit());
}

#[test]
fn errors_point_into_their_input() {
    let err = CommandError::unknown_argument("counter add x many", 14);
    assert_eq!(err.input(), Some("counter add x many"));
    assert_eq!(err.cursor(), Some(14));
    assert_eq!(
        err.to_string(),
        "Incorrect argument for command at position 14: ...ter add x <--[HERE]"
    );
}

#[test]
fn unknown_command_points_at_the_end() {
    let err = CommandError::unknown_command("dance");
    assert_eq!(err.cursor(), Some(5));
    assert!(err.to_string().ends_with("at position 5: dance<--[HERE]"));
}

#[test]
fn cursor_respects_char_boundaries() {
    let err = CommandError::invalid("bad").with_input("say héllo", 6);
    assert!(err.to_string().contains("say h<--[HERE]"));
}
